//! Error hierarchy.
//!
//! No failure in the broadcast core is fatal to the process. Transport-level
//! failures degrade to "this one connection is gone"; the enclosing room
//! stays available for everyone else.

use thiserror::Error;

/// Failure writing to (or closing) a subscriber's transport sink.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The peer is gone; the underlying channel or socket is closed.
    #[error("sink closed")]
    Closed,

    /// The peer is not keeping up; the bounded send buffer is full and the
    /// frame was dropped rather than waited on.
    #[error("sink full, frame dropped")]
    Full,

    /// The sink exceeded its lifetime drop budget and is considered dead.
    #[error("sink exceeded drop budget ({dropped} frames dropped)")]
    DropBudgetExceeded {
        /// Total lifetime frames dropped on this sink.
        dropped: u64,
    },
}

/// Top-level error type for the termcast crates.
#[derive(Debug, Error)]
pub enum TermcastError {
    /// Transport sink failure.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Event payload could not be serialized.
    #[error("event serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Configuration could not be loaded or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_error_display() {
        assert_eq!(SinkError::Closed.to_string(), "sink closed");
        assert_eq!(
            SinkError::DropBudgetExceeded { dropped: 101 }.to_string(),
            "sink exceeded drop budget (101 frames dropped)"
        );
    }

    #[test]
    fn sink_error_converts_to_termcast_error() {
        let err: TermcastError = SinkError::Full.into();
        assert!(matches!(err, TermcastError::Sink(SinkError::Full)));
    }
}
