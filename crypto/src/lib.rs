//! Cryptographic primitives for the x402 facilitator.
//!
//! The facilitator does not verify asymmetric wallet signatures; it
//! enforces a deterministic digest over an authorization's immutable
//! fields, described in full at [`signature`].

pub mod hash;
pub mod signature;

pub use hash::{sha256, sha256_hex};
pub use signature::{canonical_payload, sign, verify};

/// Errors from cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid signature")]
    InvalidSignature,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
