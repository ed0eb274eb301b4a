use std::process::ExitCode;

use clap::Parser;
use loctrack::{
    mock::{MockConfig, MockReporter},
    telemetry::init_tracing,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = MockConfig::parse();

    if let Err(err) = init_tracing("info", false) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    info!(
        user_id = %config.user_id,
        interval_ms = config.interval_ms,
        base_url = %config.base_url,
        "starting mock reporter"
    );

    let mut reporter = match MockReporter::new(config) {
        Ok(reporter) => reporter,
        Err(err) => {
            error!(error = %err, "failed to build http client");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = reporter.check_health().await {
        error!(
            base_url = %reporter.config().base_url,
            error = %err,
            "server is not running; start loctrack-server first"
        );
        return ExitCode::FAILURE;
    }
    info!("server is online");

    let total = reporter
        .run(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "failed to listen for shutdown signal");
            }
        })
        .await;

    info!(total, "mock reporter stopped");
    ExitCode::SUCCESS
}
