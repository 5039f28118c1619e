//! Periodic keep-alive ticks per connection.
//!
//! Liveness on a push-only transport is inferred purely from local write
//! success: each tick writes a heartbeat frame through the subscriber's
//! sink, and the first fatal write failure reports the connection dead via
//! the caller-supplied callback. The scheduler never mutates the registry
//! itself — the callback is wired to removal by the caller.

use std::sync::{Arc, Weak};
use std::time::Duration;

use termcast_core::{frame, SinkError};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::subscriber::Subscriber;

/// Default tick interval.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Cancellation handle for a running heartbeat task.
///
/// Cancelling is idempotent; aborting an already-finished task is a no-op.
#[derive(Debug)]
pub struct HeartbeatHandle {
    task: JoinHandle<()>,
}

impl HeartbeatHandle {
    /// Stop the heartbeat task.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the task has already ended (cancelled or failed out).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start a heartbeat for a subscriber.
///
/// Every `interval`, a heartbeat frame is written through the subscriber's
/// sink. On a fatal write failure (`Closed` or an exhausted drop budget),
/// `on_error` is invoked once and the task ends; a transiently full buffer
/// is tolerated and ticking continues. The returned handle stops the task;
/// it is normally attached to the subscriber so registry removal cancels it.
///
/// The task holds only a weak reference to the subscriber and ends quietly
/// once the handle is dropped everywhere.
pub fn start_heartbeat(
    subscriber: &Arc<Subscriber>,
    interval: Duration,
    on_error: impl FnOnce(Arc<Subscriber>) + Send + 'static,
) -> HeartbeatHandle {
    let weak: Weak<Subscriber> = Arc::downgrade(subscriber);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        // Missed intervals collapse into one tick; a keep-alive burst after
        // an executor stall tells the peer nothing extra.
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut on_error = Some(on_error);
        loop {
            let _ = ticker.tick().await;
            let Some(sub) = weak.upgrade() else {
                return;
            };
            match sub.write(Arc::from(frame::heartbeat_frame(frame::now_millis()))) {
                Ok(()) | Err(SinkError::Full) => {}
                Err(e) => {
                    debug!(
                        room_id = %sub.room_id,
                        agent_id = %sub.agent_id,
                        error = %e,
                        "heartbeat write failed"
                    );
                    if let Some(cb) = on_error.take() {
                        cb(sub);
                    }
                    return;
                }
            }
        }
    });
    HeartbeatHandle { task }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
