//! Server configuration from command-line flags and environment.

use clap::Parser;

use crate::runtime::{handle::RuntimeConfig, stream::StreamConfig};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "loctrack-server",
    version,
    about = "In-memory location tracking HTTP service"
)]
pub struct ServerConfig {
    /// Interface to bind.
    #[arg(long, env = "LOCTRACK_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3002)]
    pub port: u16,

    /// Environment tag reported by `/health`.
    #[arg(long, env = "APP_ENV", default_value = "development")]
    pub environment: String,

    /// Interval between stream checks in milliseconds.
    #[arg(long, env = "LOCTRACK_POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit JSON logs.
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl ServerConfig {
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            stream: StreamConfig {
                poll_interval_ms: self.poll_interval_ms,
                ..StreamConfig::default()
            },
            ..RuntimeConfig::default()
        }
    }
}
