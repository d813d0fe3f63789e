//! Dispute storage and resolution.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::instrument;
use x402f_common::{
    AgentAddress, DisputeId, DisputeRecord, DisputeResolution, DisputeStatus, FacilitatorError,
    Result,
};
use x402f_ledger::AuthorizationLedger;

/// Request body for creating a dispute.
pub struct CreateDisputeRequest {
    pub authorization_id: x402f_common::AuthorizationId,
    pub agent_address: AgentAddress,
    pub reason: String,
    pub evidence: Option<serde_json::Value>,
}

/// Owns dispute records and drives the authorization back and forth
/// between `validated` and `disputed` via the ledger.
pub struct DisputeManager {
    ledger: Arc<AuthorizationLedger>,
    disputes: RwLock<HashMap<DisputeId, DisputeRecord>>,
}

impl DisputeManager {
    pub fn new(ledger: Arc<AuthorizationLedger>) -> Self {
        Self {
            ledger,
            disputes: RwLock::new(HashMap::new()),
        }
    }

    /// Create a dispute against an authorization, marking it disputed
    /// and removing it from the settlement queue.
    #[instrument(skip(self, request))]
    pub fn create_dispute(&self, request: CreateDisputeRequest) -> Result<DisputeRecord> {
        let auth = self
            .ledger
            .get(&request.authorization_id)
            .ok_or_else(|| FacilitatorError::AuthorizationNotFound(request.authorization_id.to_string()))?;

        if auth.agent_address != request.agent_address {
            return Err(FacilitatorError::AgentMismatch);
        }

        self.ledger
            .mark_disputed(&request.authorization_id, &request.agent_address)?;

        let record = DisputeRecord {
            id: DisputeId::new(),
            authorization_id: request.authorization_id,
            agent_address: request.agent_address,
            merchant_address: auth.merchant_address,
            reason: request.reason,
            evidence: request.evidence,
            status: DisputeStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
            resolution: None,
        };

        self.disputes.write().insert(record.id, record.clone());
        Ok(record)
    }

    /// Resolve a dispute. `rejected` (merchant wins) returns the
    /// authorization to `validated` and re-queues it; `approved` (agent
    /// wins) leaves it `disputed` permanently.
    #[instrument(skip(self, note))]
    pub fn resolve_dispute(
        &self,
        id: &DisputeId,
        resolution: DisputeResolution,
        note: Option<String>,
    ) -> Result<DisputeRecord> {
        let authorization_id = {
            let disputes = self.disputes.read();
            let record = disputes
                .get(id)
                .ok_or_else(|| FacilitatorError::DisputeNotFound(id.to_string()))?;
            record.authorization_id.clone()
        };

        if resolution == DisputeResolution::Rejected {
            self.ledger.return_to_validated(&authorization_id)?;
        }

        let mut disputes = self.disputes.write();
        let record = disputes
            .get_mut(id)
            .ok_or_else(|| FacilitatorError::DisputeNotFound(id.to_string()))?;
        record.status = DisputeStatus::Resolved;
        record.resolved_at = Some(Utc::now());
        record.resolution = Some(note.unwrap_or_else(|| resolution.to_string()));
        Ok(record.clone())
    }

    pub fn get(&self, id: &DisputeId) -> Option<DisputeRecord> {
        self.disputes.read().get(id).cloned()
    }

    pub fn list_disputes(&self, agent: Option<&AgentAddress>) -> Vec<DisputeRecord> {
        self.disputes
            .read()
            .values()
            .filter(|d| agent.map(|a| &d.agent_address == a).unwrap_or(true))
            .cloned()
            .collect()
    }
}
