//! Read-only metrics projections over C1-C4.
//!
//! Every type here is computed on demand from ledger, dispute, and
//! settlement state; nothing in this crate mutates that state.

pub mod agent;
pub mod dispute;
pub mod health;
pub mod history;
pub mod monitor;
pub mod payment;
pub mod settlement;

pub use agent::AgentAnalytics;
pub use dispute::DisputeMetrics;
pub use health::{HealthStatus, SystemHealth};
pub use history::{HistoryEntry, MetricsHistory};
pub use monitor::{Dashboard, Monitor};
pub use payment::PaymentMetrics;
pub use settlement::SettlementMetrics;
