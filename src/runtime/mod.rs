//! Single-writer async runtime, event stream, and location streaming.

/// Event stream types emitted by the runtime.
pub mod events;
/// Handle and command loop implementation.
pub mod handle;
/// Per-subscriber polling stream of an identifier's latest location.
pub mod stream;
