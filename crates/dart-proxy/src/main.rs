//! `dart-proxy` binary.

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use dart::{DartService, DisclosureSource, OpenDartClient};
use dart_proxy::logging::setup_logging;
use dart_proxy::{AppState, Config, router};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    setup_logging();
    let config = Config::parse();

    if let Err(e) = run(config).await {
        error!(error = %e, "dart-proxy exited with an error");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let client = OpenDartClient::new(config.api_key()?)?.with_base_url(config.base_url.clone());
    info!(source = client.name(), base_url = client.base_url(), "Upstream configured");

    let service = DartService::new(Arc::new(client)).with_policy(config.policy.policy());
    let state = AppState::new(Arc::new(service), config.bearer_token());

    let listener = TcpListener::bind(config.addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        policy = ?config.policy,
        auth = state.auth_enabled(),
        "dart-proxy listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("dart-proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
