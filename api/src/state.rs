//! Application state shared across handlers.

use std::sync::Arc;

use x402f_core::Facilitator;

/// Shared application state. The boundary owns no business state of its
/// own; everything here is a handle into the facade.
#[derive(Clone)]
pub struct AppState {
    pub facilitator: Arc<Facilitator>,
}

impl AppState {
    pub fn new(facilitator: Arc<Facilitator>) -> Self {
        Self { facilitator }
    }
}
