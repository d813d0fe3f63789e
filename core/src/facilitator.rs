//! Wires C1-C5 together behind a single facade the HTTP boundary talks to.

use std::sync::Arc;

use tracing::info;
use x402f_common::{
    AgentAddress, AgentUsage, Authorization, AuthorizationId, BatchId, MerchantAddress, Result,
    SettlementBatch,
};
use x402f_disputes::DisputeManager;
use x402f_disputes::manager::CreateDisputeRequest;
use x402f_ledger::engine::{QueueOutcome, VerifyOutcome};
use x402f_ledger::AuthorizationLedger;
use x402f_monitoring::{AgentAnalytics, Dashboard, HistoryEntry, Monitor, MetricsHistory, SystemHealth};
use x402f_settlement::{NullSigner, Scheduler, Signer, SettlementEngine};

use crate::config::FacilitatorConfig;

/// Owns every component (C1-C5) and the background tasks that drive
/// them, and exposes the single operation surface the HTTP boundary
/// dispatches onto.
pub struct Facilitator {
    ledger: Arc<AuthorizationLedger>,
    disputes: Arc<DisputeManager>,
    settlement: Arc<SettlementEngine>,
    scheduler: Arc<Scheduler>,
    monitor: Arc<Monitor>,
    history: Arc<MetricsHistory>,
    config: FacilitatorConfig,
}

impl Facilitator {
    /// Assemble the facilitator from configuration and a `Signer`. Pass
    /// `None` to fall back to [`NullSigner`], the in-memory default.
    pub fn new(config: FacilitatorConfig, signer: Option<Arc<dyn Signer>>) -> Self {
        let signer = signer.unwrap_or_else(|| Arc::new(NullSigner));
        let thresholds = config.thresholds.clone();

        let check_thresholds = thresholds.clone();
        let ledger = Arc::new(AuthorizationLedger::new(move |usage, queued_total, queued_count| {
            check_thresholds.fires(usage, queued_total, queued_count)
        }));

        let disputes = Arc::new(DisputeManager::new(ledger.clone()));
        let settlement = Arc::new(SettlementEngine::new(ledger.clone(), signer, thresholds));
        let scheduler = Arc::new(Scheduler::new(
            settlement.clone(),
            config.settlement_check_interval,
        ));
        let monitor = Arc::new(Monitor::new(
            ledger.clone(),
            disputes.clone(),
            settlement.clone(),
            scheduler.clone(),
            config.auto_settlement,
        ));
        let history = Arc::new(MetricsHistory::new());

        Self {
            ledger,
            disputes,
            settlement,
            scheduler,
            monitor,
            history,
            config,
        }
    }

    /// Start background tasks: the settlement scheduler (if configured
    /// on) and metrics snapshotting.
    pub async fn start(&self) {
        if self.config.auto_settlement {
            self.scheduler.start().await;
        }
        self.history
            .start(self.monitor.clone(), self.config.metrics_snapshot_interval)
            .await;
        info!("facilitator started");
    }

    /// Stop background tasks, waiting for any in-flight tick to finish.
    pub async fn stop(&self) {
        self.scheduler.stop().await;
        self.history.stop().await;
        info!("facilitator stopped");
    }

    pub fn config(&self) -> &FacilitatorConfig {
        &self.config
    }

    // -- C1: authorization ledger -----------------------------------

    pub fn verify(&self, auth: Authorization) -> VerifyOutcome {
        self.ledger.verify(auth)
    }

    pub fn queue_for_settlement(&self, id: &AuthorizationId) -> QueueOutcome {
        self.ledger.queue_for_settlement(id)
    }

    pub fn get_authorization(&self, id: &AuthorizationId) -> Option<Authorization> {
        self.ledger.get(id)
    }

    pub fn list_by_agent(&self, agent: &AgentAddress) -> Vec<Authorization> {
        self.ledger.list_by_agent(agent)
    }

    pub fn list_pending(&self, agent: &AgentAddress) -> Vec<Authorization> {
        self.ledger.list_pending(agent)
    }

    pub fn pending_merchants(&self, agent: &AgentAddress) -> Vec<MerchantAddress> {
        self.ledger.pending_merchants(agent)
    }

    pub fn usage(&self, agent: &AgentAddress) -> Option<AgentUsage> {
        self.ledger.usage(agent)
    }

    pub fn get_batch(&self, id: &BatchId) -> Option<SettlementBatch> {
        self.ledger.get_batch(id)
    }

    pub fn list_batches(&self, agent: Option<&AgentAddress>) -> Vec<SettlementBatch> {
        self.ledger.list_batches(agent)
    }

    pub fn cleanup_expired(&self) -> usize {
        self.ledger.cleanup_expired()
    }

    // -- C3: settlement engine ---------------------------------------

    pub fn create_batch(
        &self,
        agent: &AgentAddress,
        merchant: Option<&MerchantAddress>,
    ) -> Option<SettlementBatch> {
        self.settlement.create_batch(agent, merchant)
    }

    pub async fn complete_batch(&self, batch_id: &BatchId) -> Result<()> {
        let batch = self
            .get_batch(batch_id)
            .ok_or_else(|| x402f_common::FacilitatorError::BatchNotFound(*batch_id))?;
        self.settlement.dispatch(batch).await
    }

    /// Record a batch as settled with a caller-supplied transaction
    /// signature, bypassing the `Signer`. For callers that dispatched
    /// the transfer themselves and are only reporting the outcome.
    pub fn complete_settlement(&self, batch_id: &BatchId, tx_signature: &str) -> Result<()> {
        self.ledger.complete_settlement(batch_id, tx_signature)
    }

    /// Record a batch as failed with a caller-supplied error message,
    /// bypassing the `Signer`.
    pub fn fail_settlement(&self, batch_id: &BatchId, error_message: &str) -> Result<()> {
        self.ledger.fail_settlement(batch_id, error_message)
    }

    pub async fn trigger_settlement(
        &self,
        agent: &AgentAddress,
        merchant: &MerchantAddress,
    ) -> Result<Option<BatchId>> {
        self.settlement.trigger_settlement(agent, merchant).await
    }

    pub async fn trigger_settlement_for_agent(&self, agent: &AgentAddress) -> Result<Vec<BatchId>> {
        self.settlement.trigger_settlement_for_agent(agent).await
    }

    pub async fn start_scheduler(&self) {
        self.scheduler.start().await;
    }

    pub async fn stop_scheduler(&self) {
        self.scheduler.stop().await;
    }

    pub fn scheduler_running(&self) -> bool {
        self.scheduler.is_running()
    }

    // -- C4: disputes --------------------------------------------------

    pub fn create_dispute(&self, request: CreateDisputeRequest) -> Result<x402f_common::DisputeRecord> {
        self.disputes.create_dispute(request)
    }

    pub fn resolve_dispute(
        &self,
        id: &x402f_common::DisputeId,
        resolution: x402f_common::DisputeResolution,
        note: Option<String>,
    ) -> Result<x402f_common::DisputeRecord> {
        self.disputes.resolve_dispute(id, resolution, note)
    }

    pub fn get_dispute(&self, id: &x402f_common::DisputeId) -> Option<x402f_common::DisputeRecord> {
        self.disputes.get(id)
    }

    pub fn list_disputes(&self, agent: Option<&AgentAddress>) -> Vec<x402f_common::DisputeRecord> {
        self.disputes.list_disputes(agent)
    }

    // -- C5: monitoring -------------------------------------------------

    pub fn dashboard(&self) -> Dashboard {
        self.monitor.dashboard()
    }

    pub fn health(&self) -> SystemHealth {
        self.monitor.health()
    }

    pub fn agent_analytics(&self, agent: &AgentAddress) -> Option<AgentAnalytics> {
        self.monitor.agent_analytics(agent)
    }

    pub fn all_agent_analytics(&self) -> Vec<AgentAnalytics> {
        self.monitor.all_agent_analytics()
    }

    pub fn metrics_history(&self) -> Vec<HistoryEntry> {
        self.history.snapshots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use x402f_common::{AgentAddress, AuthorizationId, Currency, MerchantAddress};
    use x402f_crypto::signature::sign;
    use x402f_settlement::{SignerError, TransferRequest};

    /// A `Signer` that always succeeds, standing in for a configured
    /// on-chain backend in tests that exercise settlement end to end.
    struct AlwaysSucceedSigner;

    #[async_trait]
    impl Signer for AlwaysSucceedSigner {
        async fn transfer(&self, request: TransferRequest) -> std::result::Result<String, SignerError> {
            Ok(format!("test-sig-{}", request.amount_minor_units))
        }
    }

    fn signed_auth(id: &str, agent: &str, merchant: &str, amount: &str) -> Authorization {
        let timestamp = 1_700_000_000_000;
        let expires_at = i64::MAX;
        let nonce = "n1";
        let sig = sign(id, agent, merchant, amount, "USDC", timestamp, expires_at, nonce);
        Authorization {
            id: AuthorizationId::new(id),
            agent_address: AgentAddress::new(agent),
            merchant_address: MerchantAddress::new(merchant),
            tool_name: "search".to_string(),
            amount: amount.to_string(),
            currency: Currency::usdc(),
            timestamp,
            expires_at,
            nonce: nonce.to_string(),
            signature: sig,
            status: x402f_common::AuthorizationStatus::Pending,
            data_hash: None,
        }
    }

    #[tokio::test]
    async fn test_verify_queue_and_trigger_settlement_end_to_end() {
        let facilitator = Facilitator::new(
            FacilitatorConfig::default(),
            Some(Arc::new(AlwaysSucceedSigner)),
        );
        let outcome = facilitator.verify(signed_auth("auth_a", "agent_a", "merchant_a", "2.00"));
        assert!(outcome.valid);

        let queued = facilitator.queue_for_settlement(&AuthorizationId::new("auth_a"));
        assert!(queued.success);

        let batch_id = facilitator
            .trigger_settlement(&AgentAddress::new("agent_a"), &MerchantAddress::new("merchant_a"))
            .await
            .unwrap()
            .unwrap();
        let batch = facilitator.get_batch(&batch_id).unwrap();
        assert_eq!(batch.status, x402f_common::BatchStatus::Completed);
    }

    #[tokio::test]
    async fn test_default_signer_fails_loudly() {
        let facilitator = Facilitator::new(FacilitatorConfig::default(), None);
        facilitator.verify(signed_auth("auth_a", "agent_a", "merchant_a", "2.00"));
        facilitator.queue_for_settlement(&AuthorizationId::new("auth_a"));

        let result = facilitator
            .trigger_settlement(&AgentAddress::new("agent_a"), &MerchantAddress::new("merchant_a"))
            .await;
        assert!(matches!(result, Err(x402f_common::FacilitatorError::DispatchFailed(_))));
    }

    #[tokio::test]
    async fn test_dispute_then_dashboard_reflects_it() {
        let facilitator = Facilitator::new(FacilitatorConfig::default(), None);
        facilitator.verify(signed_auth("auth_a", "agent_a", "merchant_a", "0.2"));
        facilitator.queue_for_settlement(&AuthorizationId::new("auth_a"));
        facilitator
            .create_dispute(CreateDisputeRequest {
                authorization_id: AuthorizationId::new("auth_a"),
                agent_address: AgentAddress::new("agent_a"),
                reason: "tool never ran".to_string(),
                evidence: None,
            })
            .unwrap();

        let dashboard = facilitator.dashboard();
        assert_eq!(dashboard.dispute.counts_by_status.get("pending"), Some(&1));
    }
}
