//! The on-chain dispatch capability.
//!
//! `Signer` is the seam between this crate's batching logic and the
//! network call that actually moves funds. Implementations own their
//! own connection pool; the engine never holds a lock across a call to
//! one.

use async_trait::async_trait;
use thiserror::Error;

/// A transfer instruction built from a settlement batch.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub sender: String,
    pub recipient: String,
    /// Minor units of `token` (e.g. USDC has 6 decimals).
    pub amount_minor_units: u64,
    pub token: String,
}

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// Capability for submitting a settlement transfer and returning the
/// resulting transaction signature.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn transfer(&self, request: TransferRequest) -> Result<String, SignerError>;
}

/// The crate default `Signer`. Always errors, so a deployment that
/// forgets to configure a real dispatch backend fails loudly instead of
/// silently completing batches without ever moving funds.
pub struct NullSigner;

#[async_trait]
impl Signer for NullSigner {
    async fn transfer(&self, _request: TransferRequest) -> Result<String, SignerError> {
        Err(SignerError::Dispatch(
            "no signer configured: NullSigner never dispatches".to_string(),
        ))
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockSigner;
    use super::*;

    fn sample_request() -> TransferRequest {
        TransferRequest {
            sender: "agent_a".to_string(),
            recipient: "merchant_a".to_string(),
            amount_minor_units: 1_000_000,
            token: "USDC".to_string(),
        }
    }

    #[tokio::test]
    async fn test_null_signer_always_errors() {
        let signer = NullSigner;
        assert!(signer.transfer(sample_request()).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_signer_can_fail() {
        let signer = MockSigner::failing();
        assert!(signer.transfer(sample_request()).await.is_err());
    }
}
