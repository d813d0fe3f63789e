//! Authorization lifecycle types.

use crate::{AgentAddress, AuthorizationId, Currency, MerchantAddress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authorization status representing the lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    /// Verified and stored, not yet queued for settlement.
    Pending,
    /// Queued for settlement, awaiting a batch.
    Validated,
    /// Member of a completed settlement batch.
    Settled,
    /// Under dispute; excluded from settlement until resolved.
    Disputed,
    /// Past `expires_at` while still `Pending`, swept by cleanup.
    Expired,
}

impl AuthorizationStatus {
    /// Get valid next states from the current state.
    pub fn valid_transitions(&self) -> &[AuthorizationStatus] {
        match self {
            AuthorizationStatus::Pending => &[
                AuthorizationStatus::Validated,
                AuthorizationStatus::Expired,
                // createDispute has no precondition that the
                // authorization already be queued.
                AuthorizationStatus::Disputed,
            ],
            AuthorizationStatus::Validated => &[
                AuthorizationStatus::Settled,
                AuthorizationStatus::Disputed,
                // failSettlement returns a batch member to Pending.
                AuthorizationStatus::Pending,
            ],
            AuthorizationStatus::Disputed => &[AuthorizationStatus::Validated],
            AuthorizationStatus::Settled => &[],
            AuthorizationStatus::Expired => &[],
        }
    }

    pub fn can_transition_to(&self, next: AuthorizationStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    pub fn is_final(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::Settled | AuthorizationStatus::Expired
        )
    }
}

/// A signed authorization to pay for a single API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    pub id: AuthorizationId,
    pub agent_address: AgentAddress,
    pub merchant_address: MerchantAddress,
    pub tool_name: String,
    pub amount: String,
    pub currency: Currency,
    pub timestamp: i64,
    pub expires_at: i64,
    pub nonce: String,
    pub signature: String,
    pub status: AuthorizationStatus,
    /// Hex digest of the fetched payload, attached after the tool call
    /// completes. Not part of the signature payload.
    pub data_hash: Option<String>,
}

impl Authorization {
    /// Transition to a new status, validating against the state machine.
    pub fn transition_to(
        &mut self,
        new_status: AuthorizationStatus,
    ) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(new_status) {
            return Err(InvalidTransition {
                from: self.status,
                to: new_status,
            });
        }
        self.status = new_status;
        Ok(())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now.timestamp_millis()
    }
}

/// Error when attempting an invalid authorization state transition.
#[derive(Debug, Clone)]
pub struct InvalidTransition {
    pub from: AuthorizationStatus,
    pub to: AuthorizationStatus,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid authorization transition from {:?} to {:?}",
            self.from, self.to
        )
    }
}

impl std::error::Error for InvalidTransition {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Authorization {
        Authorization {
            id: AuthorizationId::new("auth_a"),
            agent_address: AgentAddress::new("agent_a"),
            merchant_address: MerchantAddress::new("merchant_a"),
            tool_name: "search".to_string(),
            amount: "0.001".to_string(),
            currency: Currency::usdc(),
            timestamp: 0,
            expires_at: i64::MAX,
            nonce: "n1".to_string(),
            signature: "sig".to_string(),
            status: AuthorizationStatus::Pending,
            data_hash: None,
        }
    }

    #[test]
    fn test_pending_to_validated() {
        let mut auth = sample();
        assert!(auth.transition_to(AuthorizationStatus::Validated).is_ok());
        assert_eq!(auth.status, AuthorizationStatus::Validated);
    }

    #[test]
    fn test_settled_is_terminal() {
        let mut auth = sample();
        auth.status = AuthorizationStatus::Settled;
        assert!(auth.transition_to(AuthorizationStatus::Validated).is_err());
    }

    #[test]
    fn test_dispute_round_trip() {
        let mut auth = sample();
        auth.transition_to(AuthorizationStatus::Validated).unwrap();
        auth.transition_to(AuthorizationStatus::Disputed).unwrap();
        auth.transition_to(AuthorizationStatus::Validated).unwrap();
        assert_eq!(auth.status, AuthorizationStatus::Validated);
    }
}
