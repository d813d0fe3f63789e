//! Per-agent usage accounting.

use crate::{AgentAddress, AuthorizationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived usage index for one agent, updated on every successful
/// [`crate::AuthorizationStatus`] verification.
///
/// `total_amount` is intentionally monotonic: it is never decremented
/// on dispute or expiry, since it answers "how much has this agent ever
/// authorized," not "how much is currently owed."
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUsage {
    pub agent_address: AgentAddress,
    pub authorization_ids: Vec<AuthorizationId>,
    pub total_amount: String,
    pub request_count: u64,
    pub first_request_at: DateTime<Utc>,
    pub last_request_at: DateTime<Utc>,
}

impl AgentUsage {
    pub fn new(agent_address: AgentAddress, now: DateTime<Utc>) -> Self {
        Self {
            agent_address,
            authorization_ids: Vec::new(),
            total_amount: "0".to_string(),
            request_count: 0,
            first_request_at: now,
            last_request_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_usage_starts_at_zero() {
        let usage = AgentUsage::new(AgentAddress::new("agent_a"), Utc::now());
        assert_eq!(usage.request_count, 0);
        assert_eq!(usage.total_amount, "0");
        assert!(usage.authorization_ids.is_empty());
    }
}
