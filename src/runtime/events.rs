//! Runtime event stream payloads.

use crate::types::Identifier;

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationEvent {
    /// A record was appended to an identifier's history.
    Appended {
        /// Identifier whose history grew.
        identifier: Identifier,
        /// History length after the append.
        length: usize,
    },
    /// The runtime loop stopped; no further events follow.
    Stopped,
}
