//! C3 settlement engine endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::instrument;
use x402f_common::{AgentAddress, MerchantAddress};

use crate::dto::{
    parse_batch_id, Ack, BatchCompleteRequest, BatchCreateRequest, BatchCreateResponse,
    BatchFailRequest, SettlementTriggerRequest, SettlementTriggerResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchCreateRequest>,
) -> ApiResult<Json<BatchCreateResponse>> {
    let agent = AgentAddress::new(body.agent_address);
    let merchant = body.merchant_address.map(MerchantAddress::new);
    let batch = state.facilitator.create_batch(&agent, merchant.as_ref());
    Ok(Json(BatchCreateResponse { batch }))
}

/// Records a batch as settled with a caller-supplied transaction
/// signature. Distinct from `/settlement/trigger`, which dispatches
/// through the configured `Signer` itself.
#[instrument(skip(state))]
pub async fn complete_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchCompleteRequest>,
) -> ApiResult<Json<Ack>> {
    let batch_id = parse_batch_id(&body.batch_id)?;
    state
        .facilitator
        .complete_settlement(&batch_id, &body.tx_signature)?;
    Ok(Json(Ack::ok()))
}

#[instrument(skip(state))]
pub async fn fail_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchFailRequest>,
) -> ApiResult<Json<Ack>> {
    let batch_id = parse_batch_id(&body.batch_id)?;
    state.facilitator.fail_settlement(&batch_id, &body.error)?;
    Ok(Json(Ack::ok()))
}

#[instrument(skip(state, body))]
pub async fn trigger(
    State(state): State<AppState>,
    Json(body): Json<SettlementTriggerRequest>,
) -> ApiResult<Json<SettlementTriggerResponse>> {
    let agent = AgentAddress::new(body.agent_address);
    let batch_ids = match body.merchant_address {
        Some(merchant) => {
            let merchant = MerchantAddress::new(merchant);
            state
                .facilitator
                .trigger_settlement(&agent, &merchant)
                .await?
                .into_iter()
                .collect()
        }
        None => state.facilitator.trigger_settlement_for_agent(&agent).await?,
    };
    Ok(Json(SettlementTriggerResponse { batch_ids }))
}

pub async fn start_scheduler(State(state): State<AppState>) -> Json<Ack> {
    state.facilitator.start_scheduler().await;
    Json(Ack::ok())
}

pub async fn stop_scheduler(State(state): State<AppState>) -> Json<Ack> {
    state.facilitator.stop_scheduler().await;
    Json(Ack::ok())
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchQuery {
    pub batch_id: String,
}

pub async fn get_batch(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> ApiResult<Json<Option<x402f_common::SettlementBatch>>> {
    let batch_id = parse_batch_id(&query.batch_id)?;
    Ok(Json(state.facilitator.get_batch(&batch_id)))
}
