//! The authorization ledger: verification, storage, transitions, and
//! per-agent usage accounting.
//!
//! Every operation that touches Authorization, AgentUsage, or Batch
//! state takes the same lock, since several operations (queueing,
//! dispute creation) must mutate an authorization and the queue
//! together without an intervening observer. Nothing here suspends;
//! the only suspension points in the system are in `x402f-settlement`.

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use tracing::instrument;
use x402f_common::{
    AgentAddress, AgentUsage, Amount, Authorization, AuthorizationId, AuthorizationStatus,
    BatchId, BatchStatus, FacilitatorError, MerchantAddress, Result, SettlementBatch,
};
use x402f_crypto::signature;

use crate::queue::SettlementQueue;

/// Outcome of [`AuthorizationLedger::verify`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOutcome {
    pub valid: bool,
    pub reason: Option<String>,
}

/// Outcome of [`AuthorizationLedger::queue_for_settlement`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueOutcome {
    pub success: bool,
    pub should_settle: bool,
    pub reason: Option<String>,
}

struct LedgerState {
    authorizations: HashMap<AuthorizationId, Authorization>,
    usage: HashMap<AgentAddress, AgentUsage>,
    batches: HashMap<BatchId, SettlementBatch>,
    queue: SettlementQueue,
}

impl LedgerState {
    fn new() -> Self {
        Self {
            authorizations: HashMap::new(),
            usage: HashMap::new(),
            batches: HashMap::new(),
            queue: SettlementQueue::new(),
        }
    }
}

/// Owns authorization, usage, batch, and queue state behind a single
/// lock. See the module docs for why a single lock rather than
/// per-entity maps.
pub struct AuthorizationLedger {
    state: RwLock<LedgerState>,
    /// Callback invoked once thresholds should be evaluated for a
    /// queued `(agent, merchant)` pair; kept outside the lock-held state
    /// since it is pure policy and owned by `x402f-settlement`, not
    /// ledger data.
    threshold_check: Box<dyn Fn(&AgentUsage, Amount, usize) -> bool + Send + Sync>,
}

impl AuthorizationLedger {
    /// Create a ledger with the given `(usage, queued_total, queued_count)
    /// -> bool` threshold predicate, evaluated on every
    /// `queue_for_settlement` call to produce `should_settle`. Both
    /// `queued_total` and `queued_count` must be scoped to the specific
    /// `(agent, merchant)` pair being queued, not the agent as a whole.
    pub fn new(
        threshold_check: impl Fn(&AgentUsage, Amount, usize) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: RwLock::new(LedgerState::new()),
            threshold_check: Box::new(threshold_check),
        }
    }

    /// Verify and store an authorization.
    #[instrument(skip(self, auth), fields(id = %auth.id))]
    pub fn verify(&self, mut auth: Authorization) -> VerifyOutcome {
        let now = Utc::now();
        let mut state = self.state.write();

        if state.authorizations.contains_key(&auth.id) {
            return VerifyOutcome {
                valid: false,
                reason: Some("Authorization already exists".to_string()),
            };
        }
        if auth.is_expired_at(now) {
            return VerifyOutcome {
                valid: false,
                reason: Some("Authorization expired".to_string()),
            };
        }
        if !signature::verify(&auth) {
            return VerifyOutcome {
                valid: false,
                reason: Some("Invalid signature".to_string()),
            };
        }

        auth.status = AuthorizationStatus::Pending;
        let amount = Amount::parse(&auth.amount).unwrap_or_else(|_| Amount::zero());

        let usage = state
            .usage
            .entry(auth.agent_address.clone())
            .or_insert_with(|| AgentUsage::new(auth.agent_address.clone(), now));
        usage.authorization_ids.push(auth.id.clone());
        usage.request_count += 1;
        usage.last_request_at = now;
        let new_total = Amount::parse(&usage.total_amount).unwrap_or_else(|_| Amount::zero()) + amount;
        usage.total_amount = new_total.to_fixed_string();

        state.authorizations.insert(auth.id.clone(), auth);

        VerifyOutcome {
            valid: true,
            reason: None,
        }
    }

    /// Queue an authorization for settlement, returning whether
    /// thresholds now indicate the agent should be settled.
    #[instrument(skip(self))]
    pub fn queue_for_settlement(&self, id: &AuthorizationId) -> QueueOutcome {
        let mut state = self.state.write();

        let (agent, merchant) = match state.authorizations.get(id) {
            None => {
                return QueueOutcome {
                    success: false,
                    should_settle: false,
                    reason: Some("Authorization not found".to_string()),
                }
            }
            Some(_) if state.queue.contains(id) => {
                return QueueOutcome {
                    success: false,
                    should_settle: false,
                    reason: Some("Already queued".to_string()),
                };
            }
            Some(auth) if auth.status == AuthorizationStatus::Settled => {
                return QueueOutcome {
                    success: false,
                    should_settle: false,
                    reason: Some("Already settled".to_string()),
                }
            }
            Some(auth) => (auth.agent_address.clone(), auth.merchant_address.clone()),
        };

        {
            let auth = state.authorizations.get_mut(id).expect("checked above");
            if auth.transition_to(AuthorizationStatus::Validated).is_err() {
                return QueueOutcome {
                    success: false,
                    should_settle: false,
                    reason: Some("Authorization not eligible for queueing".to_string()),
                };
            }
        }
        state.queue.push(id.clone());

        // Scoped to this (agent, merchant) pair, not the agent as a
        // whole: thresholds fire per settlement group, and a single
        // agent can have entries queued against several merchants at
        // once.
        let queued_for_pair: Vec<&Authorization> = state
            .queue
            .iter()
            .filter_map(|qid| state.authorizations.get(qid))
            .filter(|a| a.agent_address == agent && a.merchant_address == merchant)
            .collect();
        let queued_count = queued_for_pair.len();
        let queued_total: Amount = queued_for_pair
            .iter()
            .map(|a| Amount::parse(&a.amount).unwrap_or_else(|_| Amount::zero()))
            .sum();

        let usage = state.usage.get(&agent).expect("usage created at verify");
        let should_settle = (self.threshold_check)(usage, queued_total, queued_count);

        QueueOutcome {
            success: true,
            should_settle,
            reason: if should_settle {
                Some("Settlement threshold met".to_string())
            } else {
                None
            },
        }
    }

    pub fn get(&self, id: &AuthorizationId) -> Option<Authorization> {
        self.state.read().authorizations.get(id).cloned()
    }

    /// All authorizations across every agent. Used by read-only
    /// monitoring projections; not for use in hot operational paths.
    pub fn all_authorizations(&self) -> Vec<Authorization> {
        self.state.read().authorizations.values().cloned().collect()
    }

    pub fn list_by_agent(&self, agent: &AgentAddress) -> Vec<Authorization> {
        self.state
            .read()
            .authorizations
            .values()
            .filter(|a| &a.agent_address == agent)
            .cloned()
            .collect()
    }

    /// Authorizations of `agent` currently in the queue with status `validated`.
    pub fn list_pending(&self, agent: &AgentAddress) -> Vec<Authorization> {
        let state = self.state.read();
        state
            .queue
            .iter()
            .filter_map(|id| state.authorizations.get(id))
            .filter(|a| &a.agent_address == agent && a.status == AuthorizationStatus::Validated)
            .cloned()
            .collect()
    }

    /// Unique merchant addresses across `agent`'s queued entries.
    pub fn pending_merchants(&self, agent: &AgentAddress) -> Vec<MerchantAddress> {
        let state = self.state.read();
        let mut merchants: Vec<MerchantAddress> = state
            .queue
            .iter()
            .filter_map(|id| state.authorizations.get(id))
            .filter(|a| &a.agent_address == agent)
            .map(|a| a.merchant_address.clone())
            .collect();
        merchants.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        merchants.dedup();
        merchants
    }

    pub fn usage(&self, agent: &AgentAddress) -> Option<AgentUsage> {
        self.state.read().usage.get(agent).cloned()
    }

    pub fn all_usage(&self) -> Vec<AgentUsage> {
        self.state.read().usage.values().cloned().collect()
    }

    pub fn get_batch(&self, id: &BatchId) -> Option<SettlementBatch> {
        self.state.read().batches.get(id).cloned()
    }

    pub fn list_batches(&self, agent: Option<&AgentAddress>) -> Vec<SettlementBatch> {
        self.state
            .read()
            .batches
            .values()
            .filter(|b| agent.map(|a| &b.agent_address == a).unwrap_or(true))
            .cloned()
            .collect()
    }

    /// Insert a newly created batch (called by `x402f-settlement`).
    pub fn insert_batch(&self, batch: SettlementBatch) {
        self.state.write().batches.insert(batch.id, batch);
    }

    /// Queue entries currently matching `(agent, merchant)`, with
    /// their full records, used to build a batch snapshot.
    pub fn queued_for_pair(
        &self,
        agent: &AgentAddress,
        merchant: &MerchantAddress,
    ) -> Vec<Authorization> {
        let state = self.state.read();
        state
            .queue
            .iter()
            .filter_map(|id| state.authorizations.get(id))
            .filter(|a| &a.agent_address == agent && &a.merchant_address == merchant)
            .cloned()
            .collect()
    }

    #[instrument(skip(self))]
    pub fn complete_settlement(&self, batch_id: &BatchId, tx_signature: &str) -> Result<()> {
        let mut state = self.state.write();
        let batch = state
            .batches
            .get(batch_id)
            .cloned()
            .ok_or_else(|| FacilitatorError::BatchNotFound(*batch_id))?;

        for member in &batch.authorizations {
            if let Some(auth) = state.authorizations.get_mut(&member.id) {
                let _ = auth.transition_to(AuthorizationStatus::Settled);
            }
            state.queue.remove(&member.id);
        }

        let batch = state.batches.get_mut(batch_id).expect("checked above");
        batch.status = BatchStatus::Completed;
        batch.settled_at = Some(Utc::now());
        batch.transaction_signature = Some(tx_signature.to_string());
        Ok(())
    }

    /// Fail a batch. Member authorizations return to `Pending`; queue
    /// membership is left exactly as it was at failure time (neither
    /// added nor removed), per the documented ambiguity resolution.
    #[instrument(skip(self))]
    pub fn fail_settlement(&self, batch_id: &BatchId, error_message: &str) -> Result<()> {
        let mut state = self.state.write();
        let batch = state
            .batches
            .get(batch_id)
            .cloned()
            .ok_or_else(|| FacilitatorError::BatchNotFound(*batch_id))?;

        for member in &batch.authorizations {
            if let Some(auth) = state.authorizations.get_mut(&member.id) {
                let _ = auth.transition_to(AuthorizationStatus::Pending);
            }
        }

        let batch = state.batches.get_mut(batch_id).expect("checked above");
        batch.status = BatchStatus::Failed;
        batch.error = Some(error_message.to_string());
        Ok(())
    }

    /// Sweep authorizations past `expires_at` while still `Pending`.
    /// Returns the count cleaned. Does not touch `Validated`, `Settled`,
    /// or `Disputed` records.
    #[instrument(skip(self))]
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut state = self.state.write();
        let expired_ids: Vec<AuthorizationId> = state
            .authorizations
            .values()
            .filter(|a| a.status == AuthorizationStatus::Pending && a.is_expired_at(now))
            .map(|a| a.id.clone())
            .collect();

        for id in &expired_ids {
            if let Some(auth) = state.authorizations.get_mut(id) {
                let _ = auth.transition_to(AuthorizationStatus::Expired);
            }
            state.queue.remove(id);
        }
        expired_ids.len()
    }

    /// Mark an authorization disputed and remove it from the queue.
    /// Used only by `x402f-disputes`, which must not mutate
    /// Authorization state directly.
    pub fn mark_disputed(&self, id: &AuthorizationId, agent: &AgentAddress) -> Result<Authorization> {
        let mut state = self.state.write();
        let auth = state
            .authorizations
            .get(id)
            .ok_or_else(|| FacilitatorError::AuthorizationNotFound(id.to_string()))?;
        if &auth.agent_address != agent {
            return Err(FacilitatorError::AgentMismatch);
        }
        let auth = state.authorizations.get_mut(id).expect("checked above");
        auth.transition_to(AuthorizationStatus::Disputed)
            .map_err(|e| FacilitatorError::InvalidTransition {
                from: e.from,
                to: e.to,
            })?;
        let result = auth.clone();
        state.queue.remove(id);
        Ok(result)
    }

    /// Return a disputed authorization to `Validated` and re-queue it.
    pub fn return_to_validated(&self, id: &AuthorizationId) -> Result<Authorization> {
        let mut state = self.state.write();
        let auth = state
            .authorizations
            .get_mut(id)
            .ok_or_else(|| FacilitatorError::AuthorizationNotFound(id.to_string()))?;
        auth.transition_to(AuthorizationStatus::Validated)
            .map_err(|e| FacilitatorError::InvalidTransition {
                from: e.from,
                to: e.to,
            })?;
        let result = auth.clone();
        state.queue.push(id.clone());
        Ok(result)
    }

    pub fn queue_len(&self) -> usize {
        self.state.read().queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x402f_common::{AgentAddress, AuthorizationId, Currency, MerchantAddress};
    use x402f_crypto::signature::sign;

    fn signed_auth(
        id: &str,
        agent: &str,
        merchant: &str,
        amount: &str,
        expires_at: i64,
    ) -> Authorization {
        let timestamp = 1_700_000_000_000;
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

    fn never_settle() -> impl Fn(&AgentUsage, Amount, usize) -> bool {
        |_usage, _total, _count| false
    }

    #[test]
    fn test_verify_accepts_small_authorization() {
        let ledger = AuthorizationLedger::new(never_settle());
        let auth = signed_auth("auth_a", "agent_a", "merchant_a", "0.001", i64::MAX);
        let outcome = ledger.verify(auth);
        assert!(outcome.valid);

        let list = ledger.list_by_agent(&AgentAddress::new("agent_a"));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, AuthorizationStatus::Pending);
    }

    #[test]
    fn test_verify_rejects_duplicate_id() {
        let ledger = AuthorizationLedger::new(never_settle());
        let auth = signed_auth("auth_a", "agent_a", "merchant_a", "0.001", i64::MAX);
        assert!(ledger.verify(auth.clone()).valid);
        let outcome = ledger.verify(auth);
        assert!(!outcome.valid);
        assert_eq!(outcome.reason.unwrap(), "Authorization already exists");
    }

    #[test]
    fn test_verify_rejects_expired() {
        let ledger = AuthorizationLedger::new(never_settle());
        let auth = signed_auth("auth_a", "agent_a", "merchant_a", "0.001", 1);
        let outcome = ledger.verify(auth);
        assert!(!outcome.valid);
        assert_eq!(outcome.reason.unwrap(), "Authorization expired");
    }

    #[test]
    fn test_verify_rejects_bad_signature() {
        let ledger = AuthorizationLedger::new(never_settle());
        let mut auth = signed_auth("auth_a", "agent_a", "merchant_a", "0.001", i64::MAX);
        auth.signature = "tampered".to_string();
        let outcome = ledger.verify(auth);
        assert!(!outcome.valid);
        assert_eq!(outcome.reason.unwrap(), "Invalid signature");
    }

    #[test]
    fn test_queue_without_threshold() {
        let ledger = AuthorizationLedger::new(never_settle());
        let auth = signed_auth("auth_a", "agent_a", "merchant_a", "0.001", i64::MAX);
        ledger.verify(auth);
        let outcome = ledger.queue_for_settlement(&AuthorizationId::new("auth_a"));
        assert!(outcome.success);
        assert!(!outcome.should_settle);
    }

    #[test]
    fn test_queue_reaching_threshold() {
        let ledger = AuthorizationLedger::new(|_usage, queued_total, _count| {
            queued_total.as_decimal() >= Amount::parse("1.00").unwrap().as_decimal()
        });
        ledger.verify(signed_auth("auth_a", "agent_a", "merchant_a", "0.6", i64::MAX));
        ledger.verify(signed_auth("auth_b", "agent_a", "merchant_a", "0.5", i64::MAX));

        let first = ledger.queue_for_settlement(&AuthorizationId::new("auth_a"));
        assert!(!first.should_settle);
        let second = ledger.queue_for_settlement(&AuthorizationId::new("auth_b"));
        assert!(second.should_settle);
    }

    #[test]
    fn test_threshold_is_scoped_per_merchant_not_per_agent() {
        // Same agent, two merchants. Queuing against merchant_b must not
        // see merchant_a's queued total or count.
        let ledger = AuthorizationLedger::new(|_usage, queued_total, queued_count| {
            queued_total.as_decimal() >= Amount::parse("1.00").unwrap().as_decimal()
                || queued_count >= 2
        });
        ledger.verify(signed_auth("auth_a", "agent_a", "merchant_a", "0.9", i64::MAX));
        ledger.verify(signed_auth("auth_b", "agent_a", "merchant_b", "0.9", i64::MAX));

        let first = ledger.queue_for_settlement(&AuthorizationId::new("auth_a"));
        assert!(!first.should_settle, "0.9 alone for merchant_a must not fire");

        let second = ledger.queue_for_settlement(&AuthorizationId::new("auth_b"));
        assert!(
            !second.should_settle,
            "merchant_b's own queued total (0.9) and count (1) must not be inflated \
             by merchant_a's entries"
        );
    }

    #[test]
    fn test_cleanup_expired_only_touches_pending() {
        let ledger = AuthorizationLedger::new(never_settle());
        ledger.verify(signed_auth("auth_a", "agent_a", "merchant_a", "0.1", -1));
        let cleaned = ledger.cleanup_expired();
        assert_eq!(cleaned, 1);
        let auth = ledger.get(&AuthorizationId::new("auth_a")).unwrap();
        assert_eq!(auth.status, AuthorizationStatus::Expired);
    }

    #[test]
    fn test_dispute_round_trip() {
        let ledger = AuthorizationLedger::new(never_settle());
        ledger.verify(signed_auth("auth_a", "agent_a", "merchant_a", "0.1", i64::MAX));
        ledger.queue_for_settlement(&AuthorizationId::new("auth_a"));

        let agent = AgentAddress::new("agent_a");
        ledger
            .mark_disputed(&AuthorizationId::new("auth_a"), &agent)
            .unwrap();
        assert_eq!(ledger.queue_len(), 0);

        ledger
            .return_to_validated(&AuthorizationId::new("auth_a"))
            .unwrap();
        assert_eq!(ledger.queue_len(), 1);
        let auth = ledger.get(&AuthorizationId::new("auth_a")).unwrap();
        assert_eq!(auth.status, AuthorizationStatus::Validated);
    }
}
