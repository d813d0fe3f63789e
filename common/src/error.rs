//! Error types for the facilitator.

use crate::{AuthorizationStatus, BatchId};
use thiserror::Error;

/// Error classes used by the HTTP boundary to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    State,
    Dispatch,
    Internal,
}

/// Main error type for facilitator operations.
#[derive(Error, Debug)]
pub enum FacilitatorError {
    /// An authorization with this id was already submitted.
    #[error("authorization already exists: {0}")]
    AuthorizationExists(String),

    /// `expires_at` is in the past at verification time.
    #[error("authorization expired")]
    AuthorizationExpired,

    /// The recomputed digest does not match the supplied signature.
    #[error("invalid signature")]
    InvalidSignature,

    /// No authorization with this id is known.
    #[error("authorization not found: {0}")]
    AuthorizationNotFound(String),

    /// The authorization is already present in the settlement queue.
    #[error("authorization already queued: {0}")]
    AlreadyQueued(String),

    /// The authorization has already settled.
    #[error("authorization already settled: {0}")]
    AlreadySettled(String),

    /// No batch with this id is known.
    #[error("settlement batch not found: {0}")]
    BatchNotFound(BatchId),

    /// No dispute with this id is known.
    #[error("dispute not found: {0}")]
    DisputeNotFound(String),

    /// The caller's agent address does not match the authorization's.
    #[error("agent address mismatch")]
    AgentMismatch,

    /// An illegal authorization or batch state transition was attempted.
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: AuthorizationStatus,
        to: AuthorizationStatus,
    },

    /// The external `Signer` capability failed to dispatch a batch.
    #[error("dispatch failed: {0}")]
    DispatchFailed(String),

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FacilitatorError {
    /// Classify the error for HTTP status mapping.
    pub fn class(&self) -> ErrorClass {
        match self {
            FacilitatorError::AuthorizationExists(_)
            | FacilitatorError::AuthorizationExpired
            | FacilitatorError::InvalidSignature
            | FacilitatorError::AuthorizationNotFound(_)
            | FacilitatorError::AlreadyQueued(_)
            | FacilitatorError::AlreadySettled(_)
            | FacilitatorError::BatchNotFound(_)
            | FacilitatorError::DisputeNotFound(_)
            | FacilitatorError::AgentMismatch => ErrorClass::Validation,
            FacilitatorError::InvalidTransition { .. } => ErrorClass::State,
            FacilitatorError::DispatchFailed(_) => ErrorClass::Dispatch,
            FacilitatorError::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Get a stable error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            FacilitatorError::AuthorizationExists(_) => "AUTHORIZATION_EXISTS",
            FacilitatorError::AuthorizationExpired => "AUTHORIZATION_EXPIRED",
            FacilitatorError::InvalidSignature => "INVALID_SIGNATURE",
            FacilitatorError::AuthorizationNotFound(_) => "AUTHORIZATION_NOT_FOUND",
            FacilitatorError::AlreadyQueued(_) => "ALREADY_QUEUED",
            FacilitatorError::AlreadySettled(_) => "ALREADY_SETTLED",
            FacilitatorError::BatchNotFound(_) => "BATCH_NOT_FOUND",
            FacilitatorError::DisputeNotFound(_) => "DISPUTE_NOT_FOUND",
            FacilitatorError::AgentMismatch => "AGENT_MISMATCH",
            FacilitatorError::InvalidTransition { .. } => "INVALID_TRANSITION",
            FacilitatorError::DispatchFailed(_) => "DISPATCH_FAILED",
            FacilitatorError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias for facilitator operations.
pub type Result<T> = std::result::Result<T, FacilitatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert_eq!(
            FacilitatorError::AuthorizationExpired.class(),
            ErrorClass::Validation
        );
        assert_eq!(
            FacilitatorError::DispatchFailed("rpc down".into()).class(),
            ErrorClass::Dispatch
        );
        assert_eq!(
            FacilitatorError::Internal("oops".into()).class(),
            ErrorClass::Internal
        );
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            FacilitatorError::AgentMismatch.error_code(),
            "AGENT_MISMATCH"
        );
    }
}
