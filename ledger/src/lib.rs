//! Authorization ledger and settlement queue.
//!
//! The ledger is the sole owner of [`Authorization`](x402f_common::Authorization),
//! [`AgentUsage`](x402f_common::AgentUsage), and
//! [`SettlementBatch`](x402f_common::SettlementBatch) records. The
//! settlement queue holds non-owning authorization ids and lives behind
//! the same lock as the ledger state, since several operations mutate
//! both atomically (e.g. queueing removes-on-failure, dispute creation
//! removes-on-dispute).

pub mod engine;
pub mod queue;

pub use engine::{AuthorizationLedger, QueueOutcome, VerifyOutcome};
pub use queue::SettlementQueue;
