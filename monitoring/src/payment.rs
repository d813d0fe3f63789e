//! Authorization-level metrics.

use std::collections::HashMap;

use serde::Serialize;
use x402f_common::{Amount, Authorization, AuthorizationStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMetrics {
    pub counts_by_status: HashMap<String, u64>,
    pub total_volume: String,
    pub average_amount: String,
    /// Total authorizations divided by uptime in hours.
    pub authorization_rate: f64,
}

impl PaymentMetrics {
    pub fn compute(authorizations: &[Authorization], uptime_hours: f64) -> Self {
        let mut counts_by_status: HashMap<String, u64> = HashMap::new();
        for status in [
            AuthorizationStatus::Pending,
            AuthorizationStatus::Validated,
            AuthorizationStatus::Settled,
            AuthorizationStatus::Disputed,
            AuthorizationStatus::Expired,
        ] {
            counts_by_status.insert(format!("{status:?}").to_lowercase(), 0);
        }
        for auth in authorizations {
            *counts_by_status
                .entry(format!("{:?}", auth.status).to_lowercase())
                .or_insert(0) += 1;
        }

        let total_volume: Amount = authorizations
            .iter()
            .map(|a| Amount::parse(&a.amount).unwrap_or_else(|_| Amount::zero()))
            .sum();

        let average_amount = if authorizations.is_empty() {
            Amount::zero()
        } else {
            Amount::new(total_volume.as_decimal() / rust_decimal::Decimal::from(authorizations.len()))
        };

        let authorization_rate = if uptime_hours > 0.0 {
            authorizations.len() as f64 / uptime_hours
        } else {
            0.0
        };

        Self {
            counts_by_status,
            total_volume: total_volume.to_fixed_string(),
            average_amount: average_amount.to_fixed_string(),
            authorization_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x402f_common::{AgentAddress, AuthorizationId, Currency, MerchantAddress};

    fn auth(status: AuthorizationStatus, amount: &str) -> Authorization {
        Authorization {
            id: AuthorizationId::new("a"),
            agent_address: AgentAddress::new("agent_a"),
            merchant_address: MerchantAddress::new("merchant_a"),
            tool_name: "t".to_string(),
            amount: amount.to_string(),
            currency: Currency::usdc(),
            timestamp: 0,
            expires_at: i64::MAX,
            nonce: "n".to_string(),
            signature: "s".to_string(),
            status,
            data_hash: None,
        }
    }

    #[test]
    fn test_volume_and_average() {
        let auths = vec![
            auth(AuthorizationStatus::Settled, "1.0"),
            auth(AuthorizationStatus::Pending, "3.0"),
        ];
        let metrics = PaymentMetrics::compute(&auths, 2.0);
        assert_eq!(metrics.total_volume, "4.000000");
        assert_eq!(metrics.average_amount, "2.000000");
        assert_eq!(metrics.authorization_rate, 1.0);
        assert_eq!(metrics.counts_by_status["settled"], 1);
        assert_eq!(metrics.counts_by_status["pending"], 1);
    }
}
