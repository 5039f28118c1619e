//! Per-room mapping of agent identity to active subscriber handle.
//!
//! Backed by a sharded concurrent map keyed by room, so operations on
//! unrelated rooms never serialize against each other. Inserts and removals
//! are atomic per room; readers get point-in-time snapshots, never a
//! partially constructed entry.
//!
//! Two invariants hold at all times:
//!
//! - at most one live handle per (room, agent) pair — registering a new
//!   handle displaces and closes the old one;
//! - a room entry never persists empty — removing the last handle deletes
//!   the room, keeping registry size proportional to active rooms.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use termcast_core::{AgentId, RoomId};
use tracing::debug;

use crate::subscriber::Subscriber;

/// Room → agent → handle mapping. Process-wide, in-memory, never persisted.
///
/// Shared by value (`Arc`) between the HTTP layer, the broadcaster, and the
/// lifecycle controller; all methods take `&self`.
pub struct RoomRegistry {
    rooms: DashMap<RoomId, HashMap<AgentId, Arc<Subscriber>>>,
    /// Atomic total so global count queries never touch the map locks.
    total: AtomicUsize,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            total: AtomicUsize::new(0),
        }
    }

    /// Register a subscriber, displacing any existing handle for the same
    /// (room, agent) pair.
    ///
    /// The displaced handle's heartbeat is cancelled and its sink closed
    /// (close errors are ignored — the old peer may already be gone).
    /// Always succeeds.
    pub fn add_subscriber(&self, subscriber: Arc<Subscriber>) {
        let room_id = subscriber.room_id.clone();
        let agent_id = subscriber.agent_id.clone();

        let displaced = {
            let mut room = self.rooms.entry(room_id.clone()).or_default();
            room.insert(agent_id.clone(), subscriber)
        };

        match displaced {
            Some(old) => {
                old.cancel_heartbeat();
                old.close();
                debug!(room_id = %room_id, agent_id = %agent_id, "displaced existing subscription");
            }
            None => {
                let _ = self.total.fetch_add(1, Ordering::Relaxed);
                debug!(room_id = %room_id, agent_id = %agent_id, "subscriber added");
            }
        }
    }

    /// Remove the mapping for (room, agent), if present.
    ///
    /// Cancels the handle's heartbeat and returns the handle; the caller
    /// decides whether to also close the sink (teardown does, a graceful
    /// unsubscribe lets the transport finish). Deletes the room entry when
    /// this removal empties it. No-op if absent.
    pub fn remove_subscriber(&self, room_id: &RoomId, agent_id: &AgentId) -> Option<Arc<Subscriber>> {
        let (removed, now_empty) = match self.rooms.get_mut(room_id) {
            Some(mut room) => {
                let removed = room.remove(agent_id);
                let now_empty = room.is_empty();
                (removed, now_empty)
            }
            None => (None, false),
        };

        if let Some(sub) = &removed {
            sub.cancel_heartbeat();
            let _ = self.total.fetch_sub(1, Ordering::Relaxed);
            debug!(room_id = %room_id, agent_id = %agent_id, "subscriber removed");
        }
        if now_empty {
            // Re-check emptiness under the entry lock; a concurrent add may
            // have repopulated the room since we released it.
            let _ = self.rooms.remove_if(room_id, |_, room| room.is_empty());
        }
        removed
    }

    /// Remove `subscriber` only if it is still the registered handle for its
    /// (room, agent) pair.
    ///
    /// Disconnect cleanup for a connection that was displaced by a reconnect
    /// must not tear down the displacing handle; comparing by identity makes
    /// the old connection's exit path safe to run at any time.
    pub fn remove_exact(&self, subscriber: &Arc<Subscriber>) -> bool {
        let (removed, now_empty) = match self.rooms.get_mut(&subscriber.room_id) {
            Some(mut room) => {
                let same = room
                    .get(&subscriber.agent_id)
                    .is_some_and(|current| Arc::ptr_eq(current, subscriber));
                if same {
                    let _ = room.remove(&subscriber.agent_id);
                }
                (same, room.is_empty())
            }
            None => (false, false),
        };

        if removed {
            subscriber.cancel_heartbeat();
            let _ = self.total.fetch_sub(1, Ordering::Relaxed);
            debug!(room_id = %subscriber.room_id, agent_id = %subscriber.agent_id, "subscriber removed");
        }
        if now_empty {
            let _ = self.rooms.remove_if(&subscriber.room_id, |_, room| room.is_empty());
        }
        removed
    }

    /// Whether (room, agent) currently has a live handle.
    pub fn is_subscribed(&self, room_id: &RoomId, agent_id: &AgentId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|room| room.contains_key(agent_id))
    }

    /// Snapshot of the room's current handles.
    ///
    /// A copy, not a live view: callers iterating it are unaffected by
    /// concurrent mutation.
    pub fn subscribers(&self, room_id: &RoomId) -> Vec<Arc<Subscriber>> {
        self.rooms
            .get(room_id)
            .map(|room| room.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of subscribers in one room.
    pub fn subscriber_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, |room| room.len())
    }

    /// Total subscribers across all rooms.
    pub fn total_subscriber_count(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// IDs of all rooms with at least one subscriber.
    pub fn active_rooms(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Tear down a whole room: cancel every heartbeat, close every sink,
    /// delete the room entry.
    ///
    /// Cleanup is unconditional — it completes regardless of individual
    /// close failures. Returns the handles that were cleared.
    pub fn clear_room(&self, room_id: &RoomId) -> Vec<Arc<Subscriber>> {
        let Some((_, room)) = self.rooms.remove(room_id) else {
            return Vec::new();
        };
        let _ = self.total.fetch_sub(room.len(), Ordering::Relaxed);
        let cleared: Vec<Arc<Subscriber>> = room.into_values().collect();
        for sub in &cleared {
            sub.cancel_heartbeat();
            sub.close();
        }
        debug!(room_id = %room_id, cleared = cleared.len(), "room cleared");
        cleared
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
