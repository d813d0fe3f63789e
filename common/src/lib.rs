//! Shared types for the x402 deferred payment facilitator.
//!
//! This crate contains the data model shared by every component of the
//! facilitator: identifiers, monetary amounts, and the lifecycle types
//! for authorizations, settlement batches, and disputes.

pub mod authorization;
pub mod batch;
pub mod dispute;
pub mod error;
pub mod identifiers;
pub mod monetary;
pub mod time;
pub mod usage;

pub use authorization::*;
pub use batch::*;
pub use dispute::*;
pub use error::*;
pub use identifiers::*;
pub use monetary::*;
pub use time::*;
pub use usage::*;
