//! C5 read-only monitoring endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use x402f_common::{AgentAddress, FacilitatorError};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn dashboard(
    State(state): State<AppState>,
) -> ApiResult<Json<x402f_monitoring::Dashboard>> {
    Ok(Json(state.facilitator.dashboard()))
}

pub async fn health(
    State(state): State<AppState>,
) -> ApiResult<Json<x402f_monitoring::SystemHealth>> {
    Ok(Json(state.facilitator.health()))
}

pub async fn agent(
    State(state): State<AppState>,
    Path(agent): Path<String>,
) -> ApiResult<Json<x402f_monitoring::AgentAnalytics>> {
    let agent = AgentAddress::new(agent);
    let analytics = state
        .facilitator
        .agent_analytics(&agent)
        .ok_or_else(|| FacilitatorError::AuthorizationNotFound(agent.to_string()))?;
    Ok(Json(analytics))
}

pub async fn agents(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<x402f_monitoring::AgentAnalytics>>> {
    Ok(Json(state.facilitator.all_agent_analytics()))
}

pub async fn history(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<x402f_monitoring::HistoryEntry>>> {
    Ok(Json(state.facilitator.metrics_history()))
}
