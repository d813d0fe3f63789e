//! Facade crate wiring the authorization ledger, settlement engine,
//! dispute manager, and monitoring projections into one
//! [`Facilitator`], plus its environment-driven configuration.

pub mod config;
pub mod facilitator;

pub use config::FacilitatorConfig;
pub use facilitator::Facilitator;
