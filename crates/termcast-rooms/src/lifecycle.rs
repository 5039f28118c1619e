//! Room teardown and enumeration.
//!
//! Rooms are created lazily — the registry grows an entry on the first
//! `add_subscriber` — so the controller only owns the end of a room's life
//! and the read-side queries external collaborators use for admission and
//! monitoring ("is anyone watching").

use std::sync::Arc;

use serde_json::json;
use termcast_core::{EventKind, RoomId};
use tracing::info;

use crate::broadcast::Broadcaster;
use crate::registry::RoomRegistry;

/// Controls stream-end teardown over a shared registry.
#[derive(Clone)]
pub struct RoomController {
    registry: Arc<RoomRegistry>,
    broadcaster: Broadcaster,
}

impl RoomController {
    /// Create a controller over a shared registry.
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self {
            broadcaster: Broadcaster::new(Arc::clone(&registry)),
            registry,
        }
    }

    /// End the stream backing `room_id`.
    ///
    /// Notifies every subscriber with a `stream_end` event, then clears the
    /// room: every heartbeat cancelled, every sink closed, the room entry
    /// deleted. Cleanup always completes, whether or not individual closes
    /// succeed. Ending an unknown room is a no-op.
    pub fn end_stream(&self, room_id: &RoomId, reason: &str) {
        self.broadcaster.broadcast(
            room_id,
            EventKind::StreamEnd,
            json!({ "roomId": room_id, "reason": reason }),
            None,
        );
        let cleared = self.registry.clear_room(room_id);
        if !cleared.is_empty() {
            info!(room_id = %room_id, subscribers = cleared.len(), reason, "stream ended, room cleared");
        }
    }

    /// IDs of all rooms with at least one subscriber.
    pub fn active_rooms(&self) -> Vec<RoomId> {
        self.registry.active_rooms()
    }

    /// Subscriber count for one room.
    pub fn subscriber_count(&self, room_id: &RoomId) -> usize {
        self.registry.subscriber_count(room_id)
    }

    /// Total subscribers across all rooms.
    pub fn total_subscriber_count(&self) -> usize {
        self.registry.total_subscriber_count()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
