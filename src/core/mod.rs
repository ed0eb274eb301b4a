//! In-memory authoritative location store.

/// Per-identifier append-only location histories.
pub mod store;
