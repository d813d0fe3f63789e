//! Settlement batch types.

use crate::{AgentAddress, Authorization, BatchId, Currency, MerchantAddress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Settlement batch status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Created, not yet dispatched to the signer.
    Pending,
    /// Signer call in flight.
    Processing,
    /// Signer returned a transaction signature.
    Completed,
    /// Signer errored; members reverted to `Pending`.
    Failed,
}

impl BatchStatus {
    pub fn valid_transitions(&self) -> &[BatchStatus] {
        match self {
            BatchStatus::Pending => &[BatchStatus::Processing],
            BatchStatus::Processing => &[BatchStatus::Completed, BatchStatus::Failed],
            BatchStatus::Completed => &[],
            BatchStatus::Failed => &[],
        }
    }

    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    pub fn is_final(&self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Failed)
    }
}

/// A group of authorizations for one `(agent, merchant)` pair settled in
/// a single on-chain transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementBatch {
    pub id: BatchId,
    pub agent_address: AgentAddress,
    pub merchant_address: MerchantAddress,
    /// Snapshot of member authorizations at batch-creation time.
    pub authorizations: Vec<Authorization>,
    /// Sum of member amounts, formatted to six decimal places.
    pub total_amount: String,
    pub currency: Currency,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub transaction_signature: Option<String>,
    pub error: Option<String>,
}

impl SettlementBatch {
    pub fn transition_to(&mut self, new_status: BatchStatus) -> Result<(), InvalidBatchTransition> {
        if !self.status.can_transition_to(new_status) {
            return Err(InvalidBatchTransition {
                from: self.status,
                to: new_status,
            });
        }
        self.status = new_status;
        Ok(())
    }

    pub fn member_ids(&self) -> Vec<&crate::AuthorizationId> {
        self.authorizations.iter().map(|a| &a.id).collect()
    }
}

/// Error when attempting an invalid batch state transition.
#[derive(Debug, Clone)]
pub struct InvalidBatchTransition {
    pub from: BatchStatus,
    pub to: BatchStatus,
}

impl std::fmt::Display for InvalidBatchTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid batch transition from {:?} to {:?}",
            self.from, self.to
        )
    }
}

impl std::error::Error for InvalidBatchTransition {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_state_machine() {
        assert!(BatchStatus::Pending.can_transition_to(BatchStatus::Processing));
        assert!(!BatchStatus::Pending.can_transition_to(BatchStatus::Completed));
        assert!(BatchStatus::Processing.can_transition_to(BatchStatus::Completed));
        assert!(BatchStatus::Processing.can_transition_to(BatchStatus::Failed));
        assert!(BatchStatus::Completed.is_final());
        assert!(BatchStatus::Failed.is_final());
    }
}
