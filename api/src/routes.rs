//! Route table wiring the HTTP boundary to the facade.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{disputes, health, ledger, monitoring, settlement};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let ledger_routes = Router::new()
        .route("/verify", post(ledger::verify))
        .route("/queue", post(ledger::queue))
        .route("/authorization/:id", get(ledger::get_authorization))
        .route("/list", get(ledger::list))
        .route("/pending", get(ledger::pending))
        .route("/merchants", get(ledger::merchants))
        .route("/usage", get(ledger::usage))
        .route("/batches", get(ledger::batches));

    let settlement_routes = Router::new()
        .route("/batch/create", post(settlement::create_batch))
        .route("/batch/complete", post(settlement::complete_batch))
        .route("/batch/fail", post(settlement::fail_batch))
        .route("/batch", get(settlement::get_batch))
        .route("/settlement/trigger", post(settlement::trigger))
        .route("/settlement/start", post(settlement::start_scheduler))
        .route("/settlement/stop", post(settlement::stop_scheduler));

    let dispute_routes = Router::new()
        .route("/dispute", post(disputes::create))
        .route("/dispute/resolve", post(disputes::resolve))
        .route("/disputes", get(disputes::list));

    let monitoring_routes = Router::new()
        .route("/monitoring/dashboard", get(monitoring::dashboard))
        .route("/monitoring/metrics", get(monitoring::dashboard))
        .route("/monitoring/agent/:agent", get(monitoring::agent))
        .route("/monitoring/agents", get(monitoring::agents))
        .route("/monitoring/health", get(monitoring::health))
        .route("/monitoring/history", get(monitoring::history));

    Router::new()
        .route("/health", get(health::liveness))
        .merge(ledger_routes)
        .merge(settlement_routes)
        .merge(dispute_routes)
        .merge(monitoring_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
