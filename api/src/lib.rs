//! HTTP boundary for the x402 deferred payment facilitator.
//!
//! Translates wire requests into calls on [`x402f_core::Facilitator`].
//! Successful responses carry the result's own JSON shape; failures are
//! shaped uniformly as `{success: false, error, code}` by
//! [`error::ApiError`].

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
