//! Threshold-driven settlement.
//!
//! This crate owns the policy that decides when a group of queued
//! authorizations should be settled, the on-chain dispatch seam
//! (`Signer`), and the periodic scheduler that drives both. It reads
//! and mutates batch/queue state exclusively through
//! [`x402f_ledger::AuthorizationLedger`]; it never touches ledger
//! internals directly.

pub mod engine;
pub mod scheduler;
pub mod signer;
pub mod threshold;

pub use engine::SettlementEngine;
pub use scheduler::Scheduler;
pub use signer::{NullSigner, Signer, SignerError, TransferRequest};
pub use threshold::SettlementThresholds;
