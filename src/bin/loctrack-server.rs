use std::process::ExitCode;

use clap::Parser;
use loctrack::{
    config::ServerConfig,
    core::store::LocationStore,
    http::{AppState, router},
    runtime::handle::spawn_tracker,
    telemetry::init_tracing,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::parse();

    if let Err(err) = init_tracing(&config.log_level, config.log_json) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let tracker = spawn_tracker(LocationStore::new(), config.runtime_config());
    let app = router(AppState::new(tracker.clone(), config.environment.clone()));

    let listener = match tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(host = %config.host, port = config.port, error = %err, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(
        host = %config.host,
        port = config.port,
        environment = %config.environment,
        "server listening"
    );
    for (route, what) in [
        ("POST /api/location", "record a new location"),
        ("GET  /api/location", "latest location of every id"),
        ("GET  /api/location/:id", "latest location of one id"),
        ("GET  /api/location/:id/history", "full location history of one id"),
        ("GET  /api/location/:id/stream", "server-sent events of new locations"),
        ("GET  /health", "health check"),
    ] {
        info!(route, "{what}");
    }
    warn!("storage is in memory only; all locations are lost on restart");

    // open streams end once the tracker stops, which lets graceful shutdown finish
    let shutdown_tracker = tracker.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
            if let Err(err) = shutdown_tracker.shutdown().await {
                warn!(error = %err, "tracker runtime already stopped");
            }
        })
        .await;

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server error");
            ExitCode::FAILURE
        }
    }
}
