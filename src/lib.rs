//! In-memory location tracking with per-identifier history and live streams.
//!
//! # Examples
//!
//! In-memory usage with [`core::store::LocationStore`]:
//! ```
//! use loctrack::{
//!     core::store::LocationStore,
//!     location::{LocationReport, RawLocationReport},
//!     types::Coordinates,
//!     validate::validate,
//! };
//!
//! let report = RawLocationReport::from(LocationReport {
//!     id: "u1".to_string(),
//!     coordinates: Coordinates::new(-22.9, -43.2),
//!     timestamp: "2024-01-01T00:00:00Z".to_string(),
//! });
//!
//! let mut store = LocationStore::new();
//! let record = store.append(validate(report).expect("valid report"));
//! assert_eq!(store.latest("u1"), Some(&record));
//! assert_eq!(store.length("u1"), 1);
//! ```
//!
//! Runtime usage with a live stream:
//! ```no_run
//! use loctrack::{
//!     core::store::LocationStore,
//!     location::{LocationReport, RawLocationReport},
//!     runtime::handle::{RuntimeConfig, spawn_tracker},
//!     types::Coordinates,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = spawn_tracker(LocationStore::new(), RuntimeConfig::default());
//! let mut stream = handle.subscribe("u1");
//! handle
//!     .ingest(RawLocationReport::from(LocationReport {
//!         id: "u1".to_string(),
//!         coordinates: Coordinates::new(-22.9, -43.2),
//!         timestamp: "2024-01-01T00:00:00Z".to_string(),
//!     }))
//!     .await
//!     .expect("ingest");
//! let _latest = stream.recv().await;
//! stream.detach();
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```

/// Server configuration.
pub mod config;
/// Core in-memory location store.
pub mod core;
/// HTTP routes over the tracker runtime.
pub mod http;
/// Report, validated location, and record types.
pub mod location;
/// Fake location reporter.
pub mod mock;
/// Single-writer runtime handle, events, and location streams.
pub mod runtime;
/// Tracing subscriber setup.
pub mod telemetry;
/// Shared primitive types.
pub mod types;
/// Ingestion validation.
pub mod validate;
