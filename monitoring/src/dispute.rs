//! Dispute metrics.

use std::collections::HashMap;

use serde::Serialize;
use x402f_common::{AuthorizationStatus, DisputeRecord, DisputeStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeMetrics {
    pub counts_by_status: HashMap<String, u64>,
    /// Resolved disputes whose authorization is still `disputed` (the
    /// agent's claim was upheld).
    pub approved_disputes: u64,
    /// Resolved total minus `approved_disputes`.
    pub rejected_disputes: u64,
    /// Total disputes / total authorizations * 100.
    pub dispute_rate: f64,
    pub average_resolution_time: f64,
}

impl DisputeMetrics {
    /// `authorization_status` resolves a dispute's referenced
    /// authorization to its current status, since `approved`/`rejected`
    /// is inferred from that, not stored on the dispute itself.
    pub fn compute(
        disputes: &[DisputeRecord],
        total_authorizations: usize,
        authorization_status: impl Fn(&x402f_common::AuthorizationId) -> Option<AuthorizationStatus>,
    ) -> Self {
        let mut counts_by_status: HashMap<String, u64> = HashMap::new();
        for status in [
            DisputeStatus::Pending,
            DisputeStatus::Investigating,
            DisputeStatus::Resolved,
            DisputeStatus::Rejected,
        ] {
            counts_by_status.insert(format!("{status:?}").to_lowercase(), 0);
        }
        for dispute in disputes {
            *counts_by_status
                .entry(format!("{:?}", dispute.status).to_lowercase())
                .or_insert(0) += 1;
        }

        let resolved: Vec<&DisputeRecord> = disputes
            .iter()
            .filter(|d| d.status == DisputeStatus::Resolved)
            .collect();

        let approved_disputes = resolved
            .iter()
            .filter(|d| authorization_status(&d.authorization_id) == Some(AuthorizationStatus::Disputed))
            .count() as u64;
        let rejected_disputes = resolved.len() as u64 - approved_disputes;

        let dispute_rate = if total_authorizations > 0 {
            disputes.len() as f64 / total_authorizations as f64 * 100.0
        } else {
            0.0
        };

        let resolution_times: Vec<f64> = resolved
            .iter()
            .filter_map(|d| {
                d.resolved_at
                    .map(|resolved_at| (resolved_at - d.created_at).num_milliseconds() as f64 / 1000.0)
            })
            .collect();
        let average_resolution_time = if resolution_times.is_empty() {
            0.0
        } else {
            resolution_times.iter().sum::<f64>() / resolution_times.len() as f64
        };

        Self {
            counts_by_status,
            approved_disputes,
            rejected_disputes,
            dispute_rate,
            average_resolution_time,
        }
    }
}
