//! Per-agent analytics and reputation scoring.

use chrono::{DateTime, Utc};
use serde::Serialize;
use x402f_common::{AgentAddress, AgentUsage, Authorization, AuthorizationStatus, DisputeRecord};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAnalytics {
    pub agent_address: AgentAddress,
    pub total_authorizations: u64,
    pub total_amount: String,
    pub settled_count: u64,
    pub dispute_count: u64,
    pub dispute_rate: f64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// `clamp(0, 100, settledRate - 2 * disputeRate)`.
    pub reputation_score: f64,
}

impl AgentAnalytics {
    pub fn compute(usage: &AgentUsage, authorizations: &[Authorization], disputes: &[DisputeRecord]) -> Self {
        let total_authorizations = authorizations.len() as u64;
        let settled_count = authorizations
            .iter()
            .filter(|a| a.status == AuthorizationStatus::Settled)
            .count() as u64;
        let dispute_count = disputes.len() as u64;

        let dispute_rate = if total_authorizations > 0 {
            dispute_count as f64 / total_authorizations as f64 * 100.0
        } else {
            0.0
        };

        let settled_rate = if total_authorizations > 0 {
            settled_count as f64 / total_authorizations as f64 * 100.0
        } else {
            100.0
        };

        let reputation_score = (settled_rate - 2.0 * dispute_rate).clamp(0.0, 100.0);

        Self {
            agent_address: usage.agent_address.clone(),
            total_authorizations,
            total_amount: usage.total_amount.clone(),
            settled_count,
            dispute_count,
            dispute_rate,
            first_seen: usage.first_request_at,
            last_seen: usage.last_request_at,
            reputation_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x402f_common::{AuthorizationId, Currency, DisputeId, MerchantAddress};

    fn auth(status: AuthorizationStatus) -> Authorization {
        Authorization {
            id: AuthorizationId::new("a"),
            agent_address: AgentAddress::new("agent_a"),
            merchant_address: MerchantAddress::new("merchant_a"),
            tool_name: "t".to_string(),
            amount: "1.0".to_string(),
            currency: Currency::usdc(),
            timestamp: 0,
            expires_at: i64::MAX,
            nonce: "n".to_string(),
            signature: "s".to_string(),
            status,
            data_hash: None,
        }
    }

    fn dispute() -> DisputeRecord {
        DisputeRecord {
            id: DisputeId::new(),
            authorization_id: AuthorizationId::new("a"),
            agent_address: AgentAddress::new("agent_a"),
            merchant_address: MerchantAddress::new("merchant_a"),
            reason: "x".to_string(),
            evidence: None,
            status: x402f_common::DisputeStatus::Resolved,
            created_at: Utc::now(),
            resolved_at: Some(Utc::now()),
            resolution: Some("approved".to_string()),
        }
    }

    #[test]
    fn test_reputation_score_no_history_is_perfect() {
        let usage = AgentUsage::new(AgentAddress::new("agent_a"), Utc::now());
        let analytics = AgentAnalytics::compute(&usage, &[], &[]);
        assert_eq!(analytics.reputation_score, 100.0);
    }

    #[test]
    fn test_reputation_score_penalizes_disputes() {
        let usage = AgentUsage::new(AgentAddress::new("agent_a"), Utc::now());
        let auths = vec![
            auth(AuthorizationStatus::Settled),
            auth(AuthorizationStatus::Settled),
            auth(AuthorizationStatus::Disputed),
            auth(AuthorizationStatus::Disputed),
        ];
        let disputes = vec![dispute(), dispute()];
        let analytics = AgentAnalytics::compute(&usage, &auths, &disputes);
        // settled_rate = 50, dispute_rate = 50 -> 50 - 100 = -50 -> clamp 0
        assert_eq!(analytics.reputation_score, 0.0);
    }
}
