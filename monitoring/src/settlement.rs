//! Settlement batch metrics.

use std::collections::HashMap;

use serde::Serialize;
use x402f_common::{Amount, BatchStatus, SettlementBatch};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementMetrics {
    pub counts_by_status: HashMap<String, u64>,
    pub total_settled: String,
    pub average_batch_size: f64,
    pub average_batch_amount: String,
    /// Completed batches divided by uptime in hours.
    pub settlement_rate: f64,
    /// Mean of `settledAt - createdAt` across completed batches, in seconds.
    pub average_settlement_time: f64,
}

impl SettlementMetrics {
    pub fn compute(batches: &[SettlementBatch], uptime_hours: f64) -> Self {
        let mut counts_by_status: HashMap<String, u64> = HashMap::new();
        for status in [
            BatchStatus::Pending,
            BatchStatus::Processing,
            BatchStatus::Completed,
            BatchStatus::Failed,
        ] {
            counts_by_status.insert(format!("{status:?}").to_lowercase(), 0);
        }
        for batch in batches {
            *counts_by_status
                .entry(format!("{:?}", batch.status).to_lowercase())
                .or_insert(0) += 1;
        }

        let completed: Vec<&SettlementBatch> = batches
            .iter()
            .filter(|b| b.status == BatchStatus::Completed)
            .collect();

        let total_settled: Amount = completed
            .iter()
            .map(|b| Amount::parse(&b.total_amount).unwrap_or_else(|_| Amount::zero()))
            .sum();

        let average_batch_size = if completed.is_empty() {
            0.0
        } else {
            completed.iter().map(|b| b.authorizations.len()).sum::<usize>() as f64
                / completed.len() as f64
        };

        let average_batch_amount = if completed.is_empty() {
            Amount::zero()
        } else {
            Amount::new(total_settled.as_decimal() / rust_decimal::Decimal::from(completed.len()))
        };

        let settlement_rate = if uptime_hours > 0.0 {
            completed.len() as f64 / uptime_hours
        } else {
            0.0
        };

        let settlement_times: Vec<f64> = completed
            .iter()
            .filter_map(|b| {
                b.settled_at
                    .map(|settled_at| (settled_at - b.created_at).num_milliseconds() as f64 / 1000.0)
            })
            .collect();
        let average_settlement_time = if settlement_times.is_empty() {
            0.0
        } else {
            settlement_times.iter().sum::<f64>() / settlement_times.len() as f64
        };

        Self {
            counts_by_status,
            total_settled: total_settled.to_fixed_string(),
            average_batch_size,
            average_batch_amount: average_batch_amount.to_fixed_string(),
            settlement_rate,
            average_settlement_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use x402f_common::{AgentAddress, BatchId, Currency, MerchantAddress};

    fn completed_batch(total: &str, settle_seconds: i64) -> SettlementBatch {
        let created_at = chrono::Utc::now();
        SettlementBatch {
            id: BatchId::new(),
            agent_address: AgentAddress::new("agent_a"),
            merchant_address: MerchantAddress::new("merchant_a"),
            authorizations: vec![],
            total_amount: total.to_string(),
            currency: Currency::usdc(),
            status: BatchStatus::Completed,
            created_at,
            settled_at: Some(created_at + Duration::seconds(settle_seconds)),
            transaction_signature: Some("tx".to_string()),
            error: None,
        }
    }

    #[test]
    fn test_average_settlement_time() {
        let batches = vec![completed_batch("1.0", 10), completed_batch("2.0", 30)];
        let metrics = SettlementMetrics::compute(&batches, 1.0);
        assert_eq!(metrics.average_settlement_time, 20.0);
        assert_eq!(metrics.total_settled, "3.000000");
    }
}
