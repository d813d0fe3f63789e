//! Error response shaping.
//!
//! Every response carries `{success, ...}`; failures additionally carry
//! `error` and `code`, with the HTTP status chosen from
//! [`x402f_common::ErrorClass`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use x402f_common::{ErrorClass, FacilitatorError};

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl From<FacilitatorError> for ApiError {
    fn from(err: FacilitatorError) -> Self {
        let status = match err.class() {
            ErrorClass::Validation => validation_status(&err),
            ErrorClass::State => StatusCode::CONFLICT,
            ErrorClass::Dispatch => StatusCode::BAD_GATEWAY,
            ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            success: false,
            error: err.to_string(),
            code: err.error_code().to_string(),
            status,
        }
    }
}

/// Validation errors split across 400/404/409 depending on which rule
/// failed, per the error-handling design's HTTP mapping.
fn validation_status(err: &FacilitatorError) -> StatusCode {
    match err {
        FacilitatorError::AuthorizationNotFound(_)
        | FacilitatorError::BatchNotFound(_)
        | FacilitatorError::DisputeNotFound(_) => StatusCode::NOT_FOUND,
        FacilitatorError::AuthorizationExists(_)
        | FacilitatorError::AlreadyQueued(_)
        | FacilitatorError::AlreadySettled(_) => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ApiError = FacilitatorError::AuthorizationNotFound("auth_a".to_string()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "AUTHORIZATION_NOT_FOUND");
    }

    #[test]
    fn test_dispatch_failure_maps_to_bad_gateway() {
        let err: ApiError = FacilitatorError::DispatchFailed("rpc down".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_transition_maps_to_conflict() {
        let err: ApiError = FacilitatorError::InvalidTransition {
            from: x402f_common::AuthorizationStatus::Settled,
            to: x402f_common::AuthorizationStatus::Validated,
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
