//! x402 deferred payment facilitator server binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use x402f_api::{create_router, AppState};
use x402f_core::{Facilitator, FacilitatorConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = FacilitatorConfig::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.clone()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        return Err(anyhow::anyhow!("configuration error: {}", e));
    }

    info!(
        listen_addr = %config.listen_addr,
        listen_port = config.listen_port,
        "starting x402 facilitator"
    );

    let listen_addr = format!("{}:{}", config.listen_addr, config.listen_port);
    let facilitator = Arc::new(Facilitator::new(config, None));
    facilitator.start().await;

    let router = create_router(AppState::new(facilitator.clone()));
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;

    let shutdown_facilitator = facilitator.clone();
    let shutdown = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
        info!("shutdown signal received");
        shutdown_facilitator.stop().await;
    };

    info!(listen_addr = %listen_addr, "facilitator listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("facilitator shutdown complete");
    Ok(())
}
