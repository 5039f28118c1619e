//! Event fan-out to the subscribers of a room.

use std::sync::Arc;

use metrics::counter;
use serde_json::Value;
use termcast_core::{frame, AgentId, EventKind, RoomEvent, RoomId, SinkError};
use tracing::{debug, warn};

use crate::registry::RoomRegistry;

/// Delivers events to all (or all-but-one) subscribers of a room.
///
/// Broadcast is fire-and-forget by design: a best-effort real-time
/// notification, not a guaranteed-delivery channel. Callers get no success
/// or failure report; dead peers are evicted as a side effect and show up
/// in registry counts and the drop counter metric.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<RoomRegistry>,
}

impl Broadcaster {
    /// Create a broadcaster over a shared registry.
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this broadcaster delivers through.
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Deliver one event to every current subscriber of `room_id`, except
    /// `exclude` (so a sender does not receive its own echo).
    ///
    /// Broadcasting to an empty or unknown room is a silent no-op — no
    /// viewers yet is normal. The frame is serialized once and shared.
    ///
    /// A write failure on one subscriber evicts that subscriber (and closes
    /// its dead sink) without aborting delivery to the rest. Eviction is by
    /// handle identity, not by key: the failed handle came from a snapshot,
    /// and the agent may have reconnected since — the replacement must
    /// survive the stale handle's eviction. A transiently full send buffer
    /// only drops that one frame; the sink's own drop budget decides when
    /// the connection is dead.
    ///
    /// Snapshot semantics: subscribers added after this call starts do not
    /// receive this event. Per-subscriber ordering is preserved across
    /// sequential calls because each sink is an ordered channel written
    /// synchronously here.
    pub fn broadcast(
        &self,
        room_id: &RoomId,
        kind: EventKind,
        data: Value,
        exclude: Option<&AgentId>,
    ) {
        let snapshot = self.registry.subscribers(room_id);
        if snapshot.is_empty() {
            return;
        }

        let event = RoomEvent::new(kind, data);
        let wire: Arc<str> = Arc::from(frame::encode_event_now(&event));

        let mut recipients = 0u32;
        for sub in &snapshot {
            if exclude.is_some_and(|excluded| *excluded == sub.agent_id) {
                continue;
            }
            match sub.write(Arc::clone(&wire)) {
                Ok(()) => recipients += 1,
                Err(SinkError::Full) => {
                    counter!("room_broadcast_drops_total").increment(1);
                    warn!(
                        room_id = %room_id,
                        agent_id = %sub.agent_id,
                        "frame dropped for slow subscriber (buffer full)"
                    );
                }
                Err(e) => {
                    counter!("room_broadcast_evictions_total").increment(1);
                    warn!(
                        room_id = %room_id,
                        agent_id = %sub.agent_id,
                        error = %e,
                        "evicting dead subscriber"
                    );
                    let _ = self.registry.remove_exact(sub);
                    sub.close();
                }
            }
        }
        debug!(
            room_id = %room_id,
            event = %event.kind,
            recipients,
            "broadcast event"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
