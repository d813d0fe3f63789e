//! Settlement threshold policy.
//!
//! `meetsTime` is evaluated against the agent's first-ever request, not
//! the oldest queued entry — this biases settlement toward long-lived
//! agents and must not be "fixed" to use queue age instead.

use chrono::{DateTime, Utc};
use x402f_common::{AgentUsage, Amount};

/// Settlement threshold configuration. Any one condition firing
/// triggers settlement for the group.
#[derive(Debug, Clone)]
pub struct SettlementThresholds {
    pub amount: Amount,
    pub time: chrono::Duration,
    pub count: usize,
}

impl Default for SettlementThresholds {
    fn default() -> Self {
        Self {
            amount: Amount::parse("1.00").expect("valid default"),
            time: chrono::Duration::seconds(3600),
            count: 100,
        }
    }
}

impl SettlementThresholds {
    /// Load from environment, falling back to spec defaults for any
    /// variable that is unset or unparseable.
    pub fn from_env() -> Self {
        let mut thresholds = Self::default();

        if let Ok(v) = std::env::var("SETTLEMENT_THRESHOLD_AMOUNT") {
            if let Ok(amount) = Amount::parse(&v) {
                thresholds.amount = amount;
            }
        }
        if let Ok(v) = std::env::var("SETTLEMENT_THRESHOLD_TIME") {
            if let Ok(secs) = v.parse::<i64>() {
                thresholds.time = chrono::Duration::seconds(secs);
            }
        }
        if let Ok(v) = std::env::var("SETTLEMENT_THRESHOLD_COUNT") {
            if let Ok(count) = v.parse::<usize>() {
                thresholds.count = count;
            }
        }

        thresholds
    }

    fn meets_amount(&self, queued_total: Amount) -> bool {
        queued_total.as_decimal() >= self.amount.as_decimal()
    }

    fn meets_time(&self, usage: &AgentUsage, now: DateTime<Utc>) -> bool {
        now - usage.first_request_at >= self.time
    }

    fn meets_count(&self, queued_count: usize) -> bool {
        queued_count >= self.count
    }

    /// Evaluate the policy for a group of queued entries totalling
    /// `queued_total` across `queued_count` authorizations belonging to
    /// `usage`'s agent.
    pub fn fires(&self, usage: &AgentUsage, queued_total: Amount, queued_count: usize) -> bool {
        self.meets_amount(queued_total)
            || self.meets_time(usage, Utc::now())
            || self.meets_count(queued_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x402f_common::AgentAddress;

    fn usage_at(first_request_at: DateTime<Utc>) -> AgentUsage {
        let mut u = AgentUsage::new(AgentAddress::new("agent_a"), first_request_at);
        u.total_amount = "0.10".to_string();
        u
    }

    #[test]
    fn test_meets_amount_fires() {
        let thresholds = SettlementThresholds::default();
        let usage = usage_at(Utc::now());
        assert!(thresholds.fires(&usage, Amount::parse("1.00").unwrap(), 1));
    }

    #[test]
    fn test_meets_count_fires() {
        let thresholds = SettlementThresholds::default();
        let usage = usage_at(Utc::now());
        assert!(thresholds.fires(&usage, Amount::parse("0.01").unwrap(), 100));
    }

    #[test]
    fn test_meets_time_uses_first_request_not_now() {
        let thresholds = SettlementThresholds::default();
        let usage = usage_at(Utc::now() - chrono::Duration::seconds(7200));
        assert!(thresholds.fires(&usage, Amount::zero(), 0));
    }

    #[test]
    fn test_no_condition_does_not_fire() {
        let thresholds = SettlementThresholds::default();
        let usage = usage_at(Utc::now());
        assert!(!thresholds.fires(&usage, Amount::parse("0.01").unwrap(), 1));
    }
}
