//! The per-connection subscriber handle.

use std::sync::Arc;

use parking_lot::Mutex;
use termcast_core::{frame, AgentId, RoomId, SinkError};

use crate::heartbeat::HeartbeatHandle;
use crate::sink::EventSink;

/// One open real-time connection into a room.
///
/// The registry guarantees at most one live handle per (room, agent) pair;
/// registering a second connection for the same agent displaces this one.
///
/// The heartbeat canceller lives on the handle so removal always tears the
/// timer down with the connection — no caller can leak a timer referencing
/// a closed sink.
pub struct Subscriber {
    /// Room this connection belongs to.
    pub room_id: RoomId,
    /// Subscribing agent.
    pub agent_id: AgentId,
    /// Agent display name.
    pub agent_name: String,
    /// Connection timestamp, milliseconds since epoch.
    pub connected_at: i64,
    sink: Arc<dyn EventSink>,
    heartbeat: Mutex<Option<HeartbeatHandle>>,
}

impl Subscriber {
    /// Create a handle for a validated connection.
    pub fn new(
        room_id: RoomId,
        agent_id: AgentId,
        agent_name: impl Into<String>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            room_id,
            agent_id,
            agent_name: agent_name.into(),
            connected_at: frame::now_millis(),
            sink,
            heartbeat: Mutex::new(None),
        }
    }

    /// The transport sink for this connection.
    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    /// Write one wire frame through the sink.
    pub fn write(&self, frame: Arc<str>) -> Result<(), SinkError> {
        self.sink.write(frame)
    }

    /// Close the transport. Idempotent.
    pub fn close(&self) {
        self.sink.close();
    }

    /// Attach the heartbeat canceller, cancelling any previously attached one.
    pub fn attach_heartbeat(&self, handle: HeartbeatHandle) {
        if let Some(old) = self.heartbeat.lock().replace(handle) {
            old.cancel();
        }
    }

    /// Cancel and discard the attached heartbeat, if any. Idempotent.
    pub fn cancel_heartbeat(&self) {
        if let Some(handle) = self.heartbeat.lock().take() {
            handle.cancel();
        }
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("room_id", &self.room_id)
            .field("agent_id", &self.agent_id)
            .field("agent_name", &self.agent_name)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
