//! Batch creation and on-chain dispatch.
//!
//! The dispatch pattern follows the ledger's own lock discipline: build
//! a snapshot under the ledger's lock, release it, call the `Signer`
//! with no lock held, then reacquire to apply the outcome. This engine
//! itself holds no lock of its own for ledger state; the in-flight set
//! below is the only state it owns.

use std::sync::Arc;

use dashmap::DashSet;
use tracing::{info, instrument, warn};
use x402f_common::{
    AgentAddress, Amount, BatchId, BatchStatus, Currency, FacilitatorError, MerchantAddress,
    Result, SettlementBatch,
};
use x402f_ledger::AuthorizationLedger;

use crate::signer::{Signer, TransferRequest};
use crate::threshold::SettlementThresholds;

/// Groups a batch by `(agent, merchant)`; at most one dispatch per pair
/// may be in flight.
type PairKey = (AgentAddress, MerchantAddress);

/// Creates batches from queued authorizations and dispatches them
/// through a [`Signer`].
pub struct SettlementEngine {
    ledger: Arc<AuthorizationLedger>,
    signer: Arc<dyn Signer>,
    thresholds: SettlementThresholds,
    in_flight: DashSet<PairKey>,
}

impl SettlementEngine {
    pub fn new(
        ledger: Arc<AuthorizationLedger>,
        signer: Arc<dyn Signer>,
        thresholds: SettlementThresholds,
    ) -> Self {
        Self {
            ledger,
            signer,
            thresholds,
            in_flight: DashSet::new(),
        }
    }

    pub fn thresholds(&self) -> &SettlementThresholds {
        &self.thresholds
    }

    /// Evaluate thresholds for `(agent, merchant)` against currently
    /// queued entries.
    pub fn group_fires(&self, agent: &AgentAddress, merchant: &MerchantAddress) -> bool {
        let usage = match self.ledger.usage(agent) {
            Some(u) => u,
            None => return false,
        };
        let queued = self.ledger.queued_for_pair(agent, merchant);
        if queued.is_empty() {
            return false;
        }
        let total: Amount = queued
            .iter()
            .map(|a| Amount::parse(&a.amount).unwrap_or_else(|_| Amount::zero()))
            .sum();
        self.thresholds.fires(&usage, total, queued.len())
    }

    /// Build a batch snapshot for `agent`. If `merchant` is omitted, the
    /// merchant with the most queued entries for that agent is chosen.
    /// Returns `None` if there is nothing queued for the resolved pair.
    #[instrument(skip(self))]
    pub fn create_batch(
        &self,
        agent: &AgentAddress,
        merchant: Option<&MerchantAddress>,
    ) -> Option<SettlementBatch> {
        let merchant = match merchant {
            Some(m) => m.clone(),
            None => {
                let candidates = self.ledger.pending_merchants(agent);
                let mut best: Option<(MerchantAddress, usize)> = None;
                for m in candidates {
                    let count = self.ledger.queued_for_pair(agent, &m).len();
                    if best.as_ref().map(|(_, c)| count > *c).unwrap_or(true) {
                        best = Some((m, count));
                    }
                }
                best?.0
            }
        };

        let members = self.ledger.queued_for_pair(agent, &merchant);
        if members.is_empty() {
            return None;
        }

        let total: Amount = members
            .iter()
            .map(|a| Amount::parse(&a.amount).unwrap_or_else(|_| Amount::zero()))
            .sum();
        let currency = members[0].currency.clone();

        let batch = SettlementBatch {
            id: BatchId::new(),
            agent_address: agent.clone(),
            merchant_address: merchant,
            authorizations: members,
            total_amount: total.to_fixed_string(),
            currency,
            status: BatchStatus::Pending,
            created_at: chrono::Utc::now(),
            settled_at: None,
            transaction_signature: None,
            error: None,
        };
        self.ledger.insert_batch(batch.clone());
        Some(batch)
    }

    /// Create and dispatch a batch for `(agent, merchant)` unless one is
    /// already in flight for that pair.
    #[instrument(skip(self))]
    pub async fn trigger_settlement(
        &self,
        agent: &AgentAddress,
        merchant: &MerchantAddress,
    ) -> Result<Option<BatchId>> {
        let key = (agent.clone(), merchant.clone());
        if !self.in_flight.insert(key.clone()) {
            info!(%agent, %merchant, "settlement already in flight for pair, skipping");
            return Ok(None);
        }

        let result = self.dispatch_for(agent, merchant).await;
        self.in_flight.remove(&key);
        result
    }

    async fn dispatch_for(
        &self,
        agent: &AgentAddress,
        merchant: &MerchantAddress,
    ) -> Result<Option<BatchId>> {
        let batch = match self.create_batch(agent, Some(merchant)) {
            Some(b) => b,
            None => return Ok(None),
        };
        self.dispatch(batch.clone()).await?;
        Ok(Some(batch.id))
    }

    /// Dispatch an already-created batch through the `Signer`, applying
    /// the outcome back to the ledger. No lock is held across the
    /// `Signer` call.
    #[instrument(skip(self, batch), fields(batch_id = %batch.id))]
    pub async fn dispatch(&self, batch: SettlementBatch) -> Result<()> {
        let decimals = batch.currency.decimal_places();
        let total = Amount::parse(&batch.total_amount).unwrap_or_else(|_| Amount::zero());
        let request = TransferRequest {
            sender: batch.agent_address.as_str().to_string(),
            recipient: batch.merchant_address.as_str().to_string(),
            amount_minor_units: total.to_minor_units(decimals),
            token: batch.currency.code().to_string(),
        };

        match self.signer.transfer(request).await {
            Ok(signature) => {
                self.ledger.complete_settlement(&batch.id, &signature)?;
                info!(batch_id = %batch.id, %signature, "settlement completed");
                Ok(())
            }
            Err(e) => {
                self.ledger.fail_settlement(&batch.id, &e.to_string())?;
                warn!(batch_id = %batch.id, error = %e, "settlement dispatch failed");
                Err(FacilitatorError::DispatchFailed(e.to_string()))
            }
        }
    }

    /// Scan all agents' queued entries, grouped by merchant, and trigger
    /// settlement for every group whose thresholds fire. Used by the
    /// scheduler tick and by a manual "settle everything eligible now"
    /// call.
    #[instrument(skip(self))]
    pub async fn scan_and_trigger(&self) {
        let agents: Vec<AgentAddress> = self
            .ledger
            .all_usage()
            .into_iter()
            .map(|u| u.agent_address)
            .collect();

        for agent in agents {
            let merchants = self.ledger.pending_merchants(&agent);
            for merchant in merchants {
                if self.group_fires(&agent, &merchant) {
                    if let Err(e) = self.trigger_settlement(&agent, &merchant).await {
                        warn!(%agent, %merchant, error = %e, "scheduled settlement failed");
                    }
                }
            }
        }
    }

    /// Trigger settlement manually for every merchant currently queued
    /// under `agent`, bypassing threshold evaluation.
    pub async fn trigger_settlement_for_agent(&self, agent: &AgentAddress) -> Result<Vec<BatchId>> {
        let merchants = self.ledger.pending_merchants(agent);
        let mut batches = Vec::new();
        for merchant in merchants {
            if let Some(id) = self.trigger_settlement(agent, &merchant).await? {
                batches.push(id);
            }
        }
        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::mock::MockSigner;
    use x402f_common::{Authorization, AuthorizationId, AuthorizationStatus};
    use x402f_crypto::signature::sign;

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
            status: AuthorizationStatus::Pending,
            data_hash: None,
        }
    }

    fn ledger_with_queued(pairs: &[(&str, &str, &str)]) -> Arc<AuthorizationLedger> {
        let ledger = Arc::new(AuthorizationLedger::new(|_, _, _| false));
        for (i, (agent, merchant, amount)) in pairs.iter().enumerate() {
            let id = format!("auth_{i}");
            ledger.verify(signed_auth(&id, agent, merchant, amount));
            ledger.queue_for_settlement(&AuthorizationId::new(id));
        }
        ledger
    }

    #[tokio::test]
    async fn test_create_batch_picks_busiest_merchant() {
        let ledger = ledger_with_queued(&[
            ("agent_a", "merchant_x", "0.1"),
            ("agent_a", "merchant_y", "0.1"),
            ("agent_a", "merchant_y", "0.1"),
        ]);
        let engine = SettlementEngine::new(
            ledger,
            Arc::new(MockSigner::succeeding()),
            SettlementThresholds::default(),
        );
        let batch = engine
            .create_batch(&AgentAddress::new("agent_a"), None)
            .unwrap();
        assert_eq!(batch.merchant_address, MerchantAddress::new("merchant_y"));
        assert_eq!(batch.authorizations.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_success_completes_batch() {
        let ledger = ledger_with_queued(&[("agent_a", "merchant_x", "0.5")]);
        let engine = SettlementEngine::new(
            ledger.clone(),
            Arc::new(MockSigner::succeeding()),
            SettlementThresholds::default(),
        );
        let batch_id = engine
            .trigger_settlement(&AgentAddress::new("agent_a"), &MerchantAddress::new("merchant_x"))
            .await
            .unwrap()
            .unwrap();

        let batch = ledger.get_batch(&batch_id).unwrap();
        assert_eq!(batch.status, BatchStatus::Completed);
        assert!(batch.transaction_signature.is_some());
        assert_eq!(ledger.queue_len(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_failure_reverts_members() {
        let ledger = ledger_with_queued(&[("agent_a", "merchant_x", "0.5")]);
        let engine = SettlementEngine::new(
            ledger.clone(),
            Arc::new(MockSigner::failing()),
            SettlementThresholds::default(),
        );
        let result = engine
            .trigger_settlement(&AgentAddress::new("agent_a"), &MerchantAddress::new("merchant_x"))
            .await;
        assert!(result.is_err());

        let auths = ledger.list_by_agent(&AgentAddress::new("agent_a"));
        assert_eq!(auths[0].status, AuthorizationStatus::Pending);
    }

    #[tokio::test]
    async fn test_trigger_settlement_skips_in_flight_pair() {
        let ledger = ledger_with_queued(&[("agent_a", "merchant_x", "0.5")]);
        let engine = Arc::new(SettlementEngine::new(
            ledger,
            Arc::new(MockSigner::succeeding()),
            SettlementThresholds::default(),
        ));
        let agent = AgentAddress::new("agent_a");
        let merchant = MerchantAddress::new("merchant_x");

        let a = engine.trigger_settlement(&agent, &merchant);
        let b = engine.trigger_settlement(&agent, &merchant);
        let (r1, r2) = tokio::join!(a, b);
        let successes = [r1, r2].into_iter().filter(|r| matches!(r, Ok(Some(_)))).count();
        assert_eq!(successes, 1);
    }
}
