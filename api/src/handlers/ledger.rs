//! C1 authorization ledger endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::instrument;
use x402f_common::{AgentAddress, AuthorizationId, FacilitatorError};

use crate::dto::{AgentQuery, BatchesQuery, ListQuery, QueueRequest, VerifyRequest};
use crate::error::ApiResult;
use crate::state::AppState;

#[instrument(skip(state, body))]
pub async fn verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyRequest>,
) -> ApiResult<Json<x402f_ledger::engine::VerifyOutcome>> {
    let outcome = state.facilitator.verify(body.into());
    Ok(Json(outcome))
}

#[instrument(skip(state, body))]
pub async fn queue(
    State(state): State<AppState>,
    Json(body): Json<QueueRequest>,
) -> ApiResult<Json<x402f_ledger::engine::QueueOutcome>> {
    let id = AuthorizationId::new(body.authorization_id);
    let outcome = state.facilitator.queue_for_settlement(&id);
    Ok(Json(outcome))
}

pub async fn get_authorization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<x402f_common::Authorization>> {
    let id = AuthorizationId::new(id);
    let auth = state
        .facilitator
        .get_authorization(&id)
        .ok_or_else(|| FacilitatorError::AuthorizationNotFound(id.to_string()))?;
    Ok(Json(auth))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<x402f_common::Authorization>>> {
    let agent = AgentAddress::new(query.agent_address);
    let mut authorizations = state.facilitator.list_by_agent(&agent);
    if let Some(status) = query.status {
        authorizations.retain(|a| {
            serde_json::to_value(a.status)
                .map(|v| v == serde_json::Value::String(status.clone()))
                .unwrap_or(false)
        });
    }
    Ok(Json(authorizations))
}

pub async fn pending(
    State(state): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> ApiResult<Json<Vec<x402f_common::Authorization>>> {
    let agent = AgentAddress::new(query.agent_address);
    Ok(Json(state.facilitator.list_pending(&agent)))
}

pub async fn merchants(
    State(state): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> ApiResult<Json<Vec<x402f_common::MerchantAddress>>> {
    let agent = AgentAddress::new(query.agent_address);
    Ok(Json(state.facilitator.pending_merchants(&agent)))
}

pub async fn usage(
    State(state): State<AppState>,
    Query(query): Query<AgentQuery>,
) -> ApiResult<Json<Option<x402f_common::AgentUsage>>> {
    let agent = AgentAddress::new(query.agent_address);
    Ok(Json(state.facilitator.usage(&agent)))
}

pub async fn batches(
    State(state): State<AppState>,
    Query(query): Query<BatchesQuery>,
) -> ApiResult<Json<Vec<x402f_common::SettlementBatch>>> {
    let agent = query.agent_address.map(AgentAddress::new);
    Ok(Json(state.facilitator.list_batches(agent.as_ref())))
}
