//! Canonical authorization signature scheme.
//!
//! ```text
//! payload   := id | agentAddress | merchantAddress | amount | currency | timestamp | expiresAt | nonce
//! signature := hex( SHA-256( UTF-8(payload) ) )
//! ```
//!
//! `|` is a literal pipe byte; integers render in base-10 without
//! leading zeros or fractional parts.

use crate::hash::sha256_hex;
use x402f_common::Authorization;

/// Build the pipe-delimited payload over an authorization's immutable
/// fields, in the exact field order the signature is computed over.
pub fn canonical_payload(
    id: &str,
    agent_address: &str,
    merchant_address: &str,
    amount: &str,
    currency: &str,
    timestamp: i64,
    expires_at: i64,
    nonce: &str,
) -> String {
    format!(
        "{id}|{agent_address}|{merchant_address}|{amount}|{currency}|{timestamp}|{expires_at}|{nonce}"
    )
}

/// Sign the given fields, producing the hex digest the caller should
/// place in `Authorization::signature`.
pub fn sign(
    id: &str,
    agent_address: &str,
    merchant_address: &str,
    amount: &str,
    currency: &str,
    timestamp: i64,
    expires_at: i64,
    nonce: &str,
) -> String {
    let payload = canonical_payload(
        id,
        agent_address,
        merchant_address,
        amount,
        currency,
        timestamp,
        expires_at,
        nonce,
    );
    sha256_hex(payload.as_bytes())
}

/// Recompute the digest over `auth`'s immutable fields and compare it
/// against `auth.signature`.
pub fn verify(auth: &Authorization) -> bool {
    let expected = sign(
        auth.id.as_str(),
        auth.agent_address.as_str(),
        auth.merchant_address.as_str(),
        &auth.amount,
        auth.currency.code(),
        auth.timestamp,
        auth.expires_at,
        &auth.nonce,
    );
    expected == auth.signature
}
