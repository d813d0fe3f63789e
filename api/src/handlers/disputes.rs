//! C4 dispute manager endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::instrument;
use x402f_common::{AgentAddress, AuthorizationId};
use x402f_disputes::manager::CreateDisputeRequest;

use crate::dto::{parse_dispute_id, DisputeCreateRequest, DisputeResolveRequest, DisputesQuery};
use crate::error::ApiResult;
use crate::state::AppState;

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<DisputeCreateRequest>,
) -> ApiResult<Json<x402f_common::DisputeRecord>> {
    let request = CreateDisputeRequest {
        authorization_id: AuthorizationId::new(body.authorization_id),
        agent_address: AgentAddress::new(body.agent_address),
        reason: body.reason,
        evidence: body.evidence,
    };
    let dispute = state.facilitator.create_dispute(request)?;
    Ok(Json(dispute))
}

#[instrument(skip(state, body))]
pub async fn resolve(
    State(state): State<AppState>,
    Json(body): Json<DisputeResolveRequest>,
) -> ApiResult<Json<x402f_common::DisputeRecord>> {
    let id = parse_dispute_id(&body.dispute_id)?;
    let dispute = state
        .facilitator
        .resolve_dispute(&id, body.resolution, body.note)?;
    Ok(Json(dispute))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<DisputesQuery>,
) -> ApiResult<Json<Vec<x402f_common::DisputeRecord>>> {
    let agent = query.agent_address.map(AgentAddress::new);
    Ok(Json(state.facilitator.list_disputes(agent.as_ref())))
}
