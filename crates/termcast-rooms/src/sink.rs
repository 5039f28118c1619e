//! Transport sink abstraction.
//!
//! The broadcast core never touches a network transport directly. It writes
//! through [`EventSink`], a minimal capability interface the HTTP layer
//! implements against whatever carries the bytes (chunked HTTP response,
//! socket, test channel).
//!
//! Writes must be non-blocking: a peer that cannot accept data is reported
//! as failed, never waited on, so one slow connection cannot stall fan-out
//! to the rest of a room.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use termcast_core::SinkError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Maximum total lifetime frame drops before a sink is considered dead.
///
/// A full send buffer on a single broadcast is tolerated (the frame is
/// dropped, real-time data is best-effort); a connection that keeps falling
/// behind eventually exceeds this budget and is evicted.
pub const MAX_TOTAL_DROPS: u64 = 100;

/// Write/close capability over one subscriber's transport.
///
/// Implementations must be thread-safe; a sink is written to concurrently
/// from broadcast calls and heartbeat ticks. `close` must be idempotent —
/// closing twice is not an error.
pub trait EventSink: Send + Sync {
    /// Queue one wire frame for delivery. Must not block.
    fn write(&self, frame: Arc<str>) -> Result<(), SinkError>;

    /// Release the transport. Idempotent.
    fn close(&self);

    /// Whether the sink has been closed (locally or by the peer).
    fn is_closed(&self) -> bool;
}

/// [`EventSink`] backed by a bounded tokio channel.
///
/// The HTTP layer drains the receiving half into the response body. Frames
/// are queued with `try_send`: when the channel is full the frame is dropped
/// and counted against [`MAX_TOTAL_DROPS`].
pub struct ChannelSink {
    tx: mpsc::Sender<Arc<str>>,
    closed: CancellationToken,
    drops: AtomicU64,
}

impl ChannelSink {
    /// Create a sink over a bounded channel of the given capacity.
    ///
    /// Returns the sink and the receiving half for the transport task.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(capacity);
        let sink = Self {
            tx,
            closed: CancellationToken::new(),
            drops: AtomicU64::new(0),
        };
        (sink, rx)
    }

    /// Token cancelled when the sink is closed.
    ///
    /// The transport task selects on this to terminate the response stream.
    pub fn closed_token(&self) -> CancellationToken {
        self.closed.clone()
    }

    /// Total lifetime frames dropped on this sink.
    pub fn drop_count(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }
}

impl EventSink for ChannelSink {
    fn write(&self, frame: Arc<str>) -> Result<(), SinkError> {
        if self.closed.is_cancelled() {
            return Err(SinkError::Closed);
        }
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SinkError::Closed),
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.drops.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped >= MAX_TOTAL_DROPS {
                    Err(SinkError::DropBudgetExceeded { dropped })
                } else {
                    Err(SinkError::Full)
                }
            }
        }
    }

    fn close(&self) {
        // CancellationToken::cancel is idempotent.
        self.closed.cancel();
    }

    fn is_closed(&self) -> bool {
        self.closed.is_cancelled() || self.tx.is_closed()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    #[tokio::test]
    async fn write_delivers_in_order() {
        let (sink, mut rx) = ChannelSink::new(8);
        sink.write(frame("one")).unwrap();
        sink.write(frame("two")).unwrap();
        assert_eq!(&*rx.recv().await.unwrap(), "one");
        assert_eq!(&*rx.recv().await.unwrap(), "two");
    }

    #[tokio::test]
    async fn write_after_close_fails() {
        let (sink, _rx) = ChannelSink::new(8);
        sink.close();
        assert_eq!(sink.write(frame("x")), Err(SinkError::Closed));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (sink, _rx) = ChannelSink::new(8);
        sink.close();
        sink.close();
        assert!(sink.is_closed());
    }

    #[tokio::test]
    async fn receiver_dropped_reports_closed() {
        let (sink, rx) = ChannelSink::new(8);
        drop(rx);
        assert_eq!(sink.write(frame("x")), Err(SinkError::Closed));
        assert!(sink.is_closed());
    }

    #[tokio::test]
    async fn full_channel_drops_and_counts() {
        let (sink, _rx) = ChannelSink::new(1);
        sink.write(frame("fits")).unwrap();
        assert_eq!(sink.write(frame("dropped")), Err(SinkError::Full));
        assert_eq!(sink.drop_count(), 1);
    }

    #[tokio::test]
    async fn drop_budget_exceeded_after_max_drops() {
        let (sink, _rx) = ChannelSink::new(1);
        sink.write(frame("fits")).unwrap();
        for _ in 0..MAX_TOTAL_DROPS - 1 {
            assert_eq!(sink.write(frame("x")), Err(SinkError::Full));
        }
        assert_eq!(
            sink.write(frame("x")),
            Err(SinkError::DropBudgetExceeded {
                dropped: MAX_TOTAL_DROPS
            })
        );
    }

    #[tokio::test]
    async fn closed_token_fires_on_close() {
        let (sink, _rx) = ChannelSink::new(8);
        let token = sink.closed_token();
        assert!(!token.is_cancelled());
        sink.close();
        assert!(token.is_cancelled());
    }
}
