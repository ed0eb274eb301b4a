//! Synthetic location reporter for exercising a running server.
//!
//! Reports wander randomly within `variation` degrees of a base position,
//! one every `interval_ms`, until the shutdown future resolves.

use std::future::Future;

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use rand::Rng;
use reqwest::StatusCode;
use thiserror::Error;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::{
    http::response::ApiResponse,
    location::{LocationRecord, LocationReport},
    types::{Coordinates, Identifier},
};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "loctrack-mock",
    version,
    about = "Sends fake location reports to a loctrack server"
)]
pub struct MockConfig {
    /// Identifier to report as.
    #[arg(default_value = "mock-user-001")]
    pub user_id: Identifier,

    /// Milliseconds between reports.
    #[arg(default_value_t = 1000)]
    pub interval_ms: u64,

    /// Server base URL.
    #[arg(long, env = "LOCTRACK_API_URL", default_value = "http://localhost:3002")]
    pub base_url: String,

    #[arg(long, default_value_t = -22.906847, allow_negative_numbers = true)]
    pub base_latitude: f64,

    #[arg(long, default_value_t = -43.172896, allow_negative_numbers = true)]
    pub base_longitude: f64,

    /// Maximum offset from the base position in degrees (~100 m by default).
    #[arg(long, default_value_t = 0.001)]
    pub variation: f64,

    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,

    /// Milliseconds between status lines.
    #[arg(long, default_value_t = 10_000)]
    pub stats_interval_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            user_id: "mock-user-001".to_string(),
            interval_ms: 1000,
            base_url: "http://localhost:3002".to_string(),
            base_latitude: -22.906847,
            base_longitude: -43.172896,
            variation: 0.001,
            timeout_ms: 5000,
            stats_interval_ms: 10_000,
        }
    }
}

impl MockConfig {
    pub fn base_coordinates(&self) -> Coordinates {
        Coordinates::new(self.base_latitude, self.base_longitude)
    }
}

#[derive(Debug, Error)]
pub enum MockError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server rejected report with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Uniform offset in `[-variation, variation)` around `base` on both axes.
pub fn random_coordinates<R: Rng + ?Sized>(
    rng: &mut R,
    base: Coordinates,
    variation: f64,
) -> Coordinates {
    let mut offset = || (rng.gen_range(0.0f64..1.0) - 0.5) * 2.0 * variation;
    Coordinates::new(base.latitude + offset(), base.longitude + offset())
}

pub struct MockReporter {
    client: reqwest::Client,
    config: MockConfig,
    sent: u64,
}

impl MockReporter {
    pub fn new(config: MockConfig) -> Result<Self, MockError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        info!(
            user_id = %config.user_id,
            endpoint = %format!("{}/api/location", base_url(&config)),
            "mock reporter initialized"
        );
        Ok(Self {
            client,
            config,
            sent: 0,
        })
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub async fn check_health(&self) -> Result<(), MockError> {
        self.client
            .get(format!("{}/health", base_url(&self.config)))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub fn next_report<R: Rng + ?Sized>(&self, rng: &mut R) -> LocationReport {
        LocationReport {
            id: self.config.user_id.clone(),
            coordinates: random_coordinates(
                rng,
                self.config.base_coordinates(),
                self.config.variation,
            ),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub async fn send_report(
        &mut self,
        report: &LocationReport,
    ) -> Result<LocationRecord, MockError> {
        let response = self
            .client
            .post(format!("{}/api/location", base_url(&self.config)))
            .json(report)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MockError::Rejected { status, body });
        }

        let body = response.json::<ApiResponse<LocationRecord>>().await?;
        self.sent += 1;
        match body.data {
            Some(record) => Ok(record),
            None => Err(MockError::Rejected {
                status,
                body: body.message,
            }),
        }
    }

    /// Sends one report immediately and then one per interval until
    /// `shutdown` resolves. A report still in flight at shutdown is
    /// abandoned. Returns the number of accepted reports.
    pub async fn run<F>(&mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut send_ticker = time::interval(Duration::from_millis(self.config.interval_ms.max(1)));
        send_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let stats_period = Duration::from_millis(self.config.stats_interval_ms.max(1));
        let mut stats_ticker = time::interval_at(Instant::now() + stats_period, stats_period);

        info!(interval_ms = self.config.interval_ms, "sending location reports");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = send_ticker.tick() => {
                    let report = self.next_report(&mut rand::thread_rng());
                    let result = tokio::select! {
                        _ = &mut shutdown => break,
                        result = self.send_report(&report) => result,
                    };
                    match result {
                        Ok(record) => info!(
                            seq = self.sent,
                            latitude = %format!("{:.6}", record.coordinates.latitude),
                            longitude = %format!("{:.6}", record.coordinates.longitude),
                            timestamp = %record.reported_at,
                            "location report accepted"
                        ),
                        Err(err) => warn!(error = %err, "failed to send location report"),
                    }
                }
                _ = stats_ticker.tick() => info!(sent = self.sent, "mock reporter status"),
            }
        }

        self.sent
    }
}

fn base_url(config: &MockConfig) -> &str {
    config.base_url.trim_end_matches('/')
}
