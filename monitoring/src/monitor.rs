//! Aggregates the individual projections into the monitoring API surface.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use x402f_common::AgentAddress;
use x402f_disputes::DisputeManager;
use x402f_ledger::AuthorizationLedger;
use x402f_settlement::{Scheduler, SettlementEngine};

use crate::agent::AgentAnalytics;
use crate::dispute::DisputeMetrics;
use crate::health::SystemHealth;
use crate::payment::PaymentMetrics;
use crate::settlement::SettlementMetrics;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub payment: PaymentMetrics,
    pub settlement: SettlementMetrics,
    pub dispute: DisputeMetrics,
    pub health: SystemHealth,
}

/// Read-only view over the facilitator's core components. Holds no
/// state of its own besides the process start time and the settlement
/// configuration flag needed for health evaluation.
pub struct Monitor {
    ledger: Arc<AuthorizationLedger>,
    disputes: Arc<DisputeManager>,
    settlement: Arc<SettlementEngine>,
    scheduler: Arc<Scheduler>,
    started_at: DateTime<Utc>,
    auto_settlement_enabled: bool,
}

impl Monitor {
    pub fn new(
        ledger: Arc<AuthorizationLedger>,
        disputes: Arc<DisputeManager>,
        settlement: Arc<SettlementEngine>,
        scheduler: Arc<Scheduler>,
        auto_settlement_enabled: bool,
    ) -> Self {
        Self {
            ledger,
            disputes,
            settlement,
            scheduler,
            started_at: Utc::now(),
            auto_settlement_enabled,
        }
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    fn uptime_hours(&self) -> f64 {
        (self.uptime_seconds() as f64 / 3600.0).max(1.0 / 3600.0)
    }

    pub fn payment_metrics(&self) -> PaymentMetrics {
        PaymentMetrics::compute(&self.ledger.all_authorizations(), self.uptime_hours())
    }

    pub fn settlement_metrics(&self) -> SettlementMetrics {
        SettlementMetrics::compute(&self.ledger.list_batches(None), self.uptime_hours())
    }

    pub fn dispute_metrics(&self) -> DisputeMetrics {
        let total_authorizations = self.ledger.all_authorizations().len();
        let disputes = self.disputes.list_disputes(None);
        DisputeMetrics::compute(&disputes, total_authorizations, |id| {
            self.ledger.get(id).map(|a| a.status)
        })
    }

    pub fn health(&self) -> SystemHealth {
        let batches = self.ledger.list_batches(None);
        let completed = batches
            .iter()
            .filter(|b| b.status == x402f_common::BatchStatus::Completed)
            .count() as u64;
        let failed = batches
            .iter()
            .filter(|b| b.status == x402f_common::BatchStatus::Failed)
            .count() as u64;

        SystemHealth::compute(
            self.uptime_seconds(),
            self.ledger.queue_len(),
            self.auto_settlement_enabled,
            self.scheduler.is_running(),
            completed,
            failed,
        )
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            payment: self.payment_metrics(),
            settlement: self.settlement_metrics(),
            dispute: self.dispute_metrics(),
            health: self.health(),
        }
    }

    pub fn agent_analytics(&self, agent: &AgentAddress) -> Option<AgentAnalytics> {
        let usage = self.ledger.usage(agent)?;
        let authorizations = self.ledger.list_by_agent(agent);
        let disputes = self
            .disputes
            .list_disputes(Some(agent));
        Some(AgentAnalytics::compute(&usage, &authorizations, &disputes))
    }

    pub fn all_agent_analytics(&self) -> Vec<AgentAnalytics> {
        self.ledger
            .all_usage()
            .iter()
            .map(|usage| {
                let authorizations = self.ledger.list_by_agent(&usage.agent_address);
                let disputes = self.disputes.list_disputes(Some(&usage.agent_address));
                AgentAnalytics::compute(usage, &authorizations, &disputes)
            })
            .collect()
    }

    /// Reference to the underlying engine, for callers that need to
    /// trigger settlement alongside reading metrics (the HTTP boundary).
    pub fn settlement_engine(&self) -> &Arc<SettlementEngine> {
        &self.settlement
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }
}
