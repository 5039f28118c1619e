//! SSE wire framing.
//!
//! Each event is a textual frame: an `event:` line with the kind tag, a
//! `data:` line with the JSON payload, and a blank terminator line. The
//! payload is the producer's data object with the `type` tag and a server
//! timestamp (milliseconds since epoch) merged in at the top level, matching
//! what reconnecting clients already parse.
//!
//! Keep-alives come in two shapes: a `heartbeat` event frame carrying the
//! timestamp, and a bare comment frame (`: ping`) for intermediaries that
//! only need to see bytes move.

use chrono::Utc;
use serde_json::{Map, Value};

use crate::events::RoomEvent;

/// Comment frame, a protocol-level no-op.
pub const COMMENT_FRAME: &str = ": ping\n\n";

/// Current server time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Encode an event as an SSE frame, stamping it with `timestamp_ms`.
///
/// If the event's data is a JSON object, `type` and `timestamp` are merged
/// into it at the top level (producer-supplied keys of the same name are
/// overwritten). Non-object payloads are wrapped under a `data` key so the
/// frame body is always an object.
pub fn encode_event(event: &RoomEvent, timestamp_ms: i64) -> String {
    let mut body = match &event.data {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            let _ = map.insert("data".to_owned(), other.clone());
            map
        }
    };
    let _ = body.insert("type".to_owned(), Value::from(event.kind.as_str()));
    let _ = body.insert("timestamp".to_owned(), Value::from(timestamp_ms));

    // Serializing a Map<String, Value> cannot fail.
    let json = Value::Object(body).to_string();
    format!("event: {}\ndata: {}\n\n", event.kind, json)
}

/// Encode an event stamped with the current server time.
pub fn encode_event_now(event: &RoomEvent) -> String {
    encode_event(event, now_millis())
}

/// Encode a heartbeat keep-alive frame.
pub fn heartbeat_frame(timestamp_ms: i64) -> String {
    format!("event: heartbeat\ndata: {{\"timestamp\":{timestamp_ms}}}\n\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
