//! Dispute lifecycle types.

use crate::{AgentAddress, AuthorizationId, DisputeId, MerchantAddress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dispute status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    /// Opened, awaiting resolution.
    Pending,
    /// Reachable by the data model but no operation transitions into it
    /// yet; no review workflow is defined in this version.
    Investigating,
    /// Terminal status reached by `resolveDispute` regardless of which
    /// [`DisputeResolution`] was recorded. The resolution field, not a
    /// distinct status, carries whether the agent or merchant prevailed.
    Resolved,
    /// Present for wire compatibility with the full status enumeration;
    /// no operation transitions a dispute into this status directly.
    Rejected,
}

/// Outcome of resolving a dispute.
///
/// The naming is deliberately inverted from ordinary intuition: an
/// `Approved` dispute means the agent's claim was upheld, so the
/// authorization is *not* settled. A `Rejected` dispute means the
/// merchant's claim was upheld, so the authorization returns to the
/// settlement queue. This mirrors the wire contract exactly; renaming
/// the variants would desynchronize code from the API surface they
/// serialize to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisputeResolution {
    Approved,
    Rejected,
}

impl std::fmt::Display for DisputeResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisputeResolution::Approved => write!(f, "approved"),
            DisputeResolution::Rejected => write!(f, "rejected"),
        }
    }
}

/// A dispute opened against an authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeRecord {
    pub id: DisputeId,
    pub authorization_id: AuthorizationId,
    pub agent_address: AgentAddress,
    pub merchant_address: MerchantAddress,
    pub reason: String,
    pub evidence: Option<serde_json::Value>,
    pub status: DisputeStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_serializes_literally() {
        let approved = serde_json::to_string(&DisputeResolution::Approved).unwrap();
        assert_eq!(approved, "\"approved\"");
        let rejected = serde_json::to_string(&DisputeResolution::Rejected).unwrap();
        assert_eq!(rejected, "\"rejected\"");
    }
}
