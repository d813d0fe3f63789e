//! Request/response bodies for the HTTP boundary.
//!
//! Success responses carry the result type's own JSON shape directly,
//! matching the teacher's convention of returning domain DTOs without
//! an extra wrapper layer. Operations with no natural payload (batch
//! completion, scheduler control) return [`Ack`] so the body still
//! carries `{success: true}` rather than an empty object. Failures are
//! shaped uniformly by [`crate::error::ApiError`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use x402f_common::{
    AgentAddress, Authorization, AuthorizationId, AuthorizationStatus, BatchId, Currency,
    DisputeId, DisputeResolution, MerchantAddress,
};

#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Body of `POST /verify`. Mirrors an authorization's immutable fields;
/// `status` and `dataHash` are not caller-supplied.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub id: String,
    pub agent_address: String,
    pub merchant_address: String,
    pub tool_name: String,
    pub amount: String,
    pub currency: String,
    pub timestamp: i64,
    pub expires_at: i64,
    pub nonce: String,
    pub signature: String,
}

impl From<VerifyRequest> for Authorization {
    fn from(req: VerifyRequest) -> Self {
        Authorization {
            id: AuthorizationId::new(req.id),
            agent_address: AgentAddress::new(req.agent_address),
            merchant_address: MerchantAddress::new(req.merchant_address),
            tool_name: req.tool_name,
            amount: req.amount,
            currency: Currency::new(req.currency),
            timestamp: req.timestamp,
            expires_at: req.expires_at,
            nonce: req.nonce,
            signature: req.signature,
            status: AuthorizationStatus::Pending,
            data_hash: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRequest {
    pub authorization_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateRequest {
    pub agent_address: String,
    pub merchant_address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateResponse {
    pub batch: Option<x402f_common::SettlementBatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCompleteRequest {
    pub batch_id: String,
    pub tx_signature: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailRequest {
    pub batch_id: String,
    pub error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentQuery {
    pub agent_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub agent_address: String,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchesQuery {
    pub agent_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputesQuery {
    pub agent_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeCreateRequest {
    pub authorization_id: String,
    pub agent_address: String,
    pub reason: String,
    pub evidence: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeResolveRequest {
    pub dispute_id: String,
    pub resolution: DisputeResolution,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementTriggerRequest {
    pub agent_address: String,
    pub merchant_address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementTriggerResponse {
    pub batch_ids: Vec<BatchId>,
}

/// A malformed id is reported the same way as an unknown one: the
/// caller can't tell the difference from the response, and `BatchId`
/// carries no "invalid" variant of its own, so a nil sentinel stands in
/// for "this could never have been minted by the engine".
pub fn parse_batch_id(s: &str) -> Result<BatchId, x402f_common::FacilitatorError> {
    BatchId::parse(s)
        .map_err(|_| x402f_common::FacilitatorError::BatchNotFound(BatchId::from_uuid(Uuid::nil())))
}

pub fn parse_dispute_id(s: &str) -> Result<DisputeId, x402f_common::FacilitatorError> {
    DisputeId::parse(s).map_err(|_| x402f_common::FacilitatorError::DisputeNotFound(s.to_string()))
}
