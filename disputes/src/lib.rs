//! Dispute lifecycle management.
//!
//! Owns [`DisputeRecord`](x402f_common::DisputeRecord) storage exclusively.
//! Authorization state transitions triggered by a dispute go through
//! [`x402f_ledger::AuthorizationLedger`]'s `mark_disputed`/`return_to_validated`,
//! never by mutating an `Authorization` directly.

pub mod manager;

pub use manager::DisputeManager;
