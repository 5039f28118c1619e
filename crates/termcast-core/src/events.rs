//! Room event vocabulary.
//!
//! Every frame pushed to a subscriber carries an event kind (a string tag on
//! the wire) and an opaque JSON payload. The vocabulary is fixed but
//! extensible: the well-known kinds below cover chat, presence, and stream
//! lifecycle; anything else round-trips through [`EventKind::Other`].

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind tag for a room event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Connection confirmation sent to a newly subscribed agent.
    Connected,
    /// Chat message in the room.
    Chat,
    /// An agent opened a real-time subscription to the room.
    AgentConnected,
    /// An agent's real-time subscription closed.
    AgentDisconnected,
    /// An agent joined the room as a viewer.
    AgentJoin,
    /// An agent left the room.
    AgentLeave,
    /// The stream backing the room ended.
    StreamEnd,
    /// Keep-alive tick.
    Heartbeat,
    /// Any other tag; kept verbatim for forward compatibility.
    Other(String),
}

impl EventKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connected => "connected",
            Self::Chat => "chat",
            Self::AgentConnected => "agent_connected",
            Self::AgentDisconnected => "agent_disconnected",
            Self::AgentJoin => "agent_join",
            Self::AgentLeave => "agent_leave",
            Self::StreamEnd => "stream_end",
            Self::Heartbeat => "heartbeat",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s {
            "connected" => Self::Connected,
            "chat" => Self::Chat,
            "agent_connected" => Self::AgentConnected,
            "agent_disconnected" => Self::AgentDisconnected,
            "agent_join" => Self::AgentJoin,
            "agent_leave" => Self::AgentLeave,
            "stream_end" => Self::StreamEnd,
            "heartbeat" => Self::Heartbeat,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KindVisitor;

        impl Visitor<'_> for KindVisitor {
            type Value = EventKind;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an event kind string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<EventKind, E> {
                Ok(EventKind::from(v))
            }
        }

        deserializer.deserialize_str(KindVisitor)
    }
}

/// One event destined for the subscribers of a room.
///
/// The `data` payload is opaque JSON supplied by the producer. On the wire
/// the payload is flattened together with the `type` tag and a server
/// timestamp; see [`crate::frame::encode_event`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomEvent {
    /// Event kind tag.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Event-specific data (opaque JSON object).
    pub data: Value,
}

impl RoomEvent {
    /// Build an event from a kind and payload.
    pub fn new(kind: EventKind, data: Value) -> Self {
        Self { kind, data }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_kinds_round_trip() {
        for name in [
            "connected",
            "chat",
            "agent_connected",
            "agent_disconnected",
            "agent_join",
            "agent_leave",
            "stream_end",
            "heartbeat",
        ] {
            let kind = EventKind::from(name);
            assert!(!matches!(kind, EventKind::Other(_)), "{name} should be well-known");
            assert_eq!(kind.as_str(), name);
        }
    }

    #[test]
    fn unknown_kind_kept_verbatim() {
        let kind = EventKind::from("mod_action");
        assert_eq!(kind, EventKind::Other("mod_action".into()));
        assert_eq!(kind.as_str(), "mod_action");
    }

    #[test]
    fn kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&EventKind::AgentJoin).unwrap();
        assert_eq!(json, "\"agent_join\"");
        let back: EventKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EventKind::AgentJoin);
    }

    #[test]
    fn room_event_tagged_with_type() {
        let event = RoomEvent::new(EventKind::Chat, serde_json::json!({"content": "hi"}));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "chat");
        assert_eq!(value["data"]["content"], "hi");
    }
}
