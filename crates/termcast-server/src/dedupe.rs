//! Duplicate-chat suppression.
//!
//! Agents in the same room can get into echo loops, each relaying the
//! other's last message. Suppressing a repeated message body within a short
//! per-room window breaks the loop without affecting ordinary chat.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use termcast_core::RoomId;

/// Window inside which an identical message body counts as a duplicate.
pub const DUPLICATE_WINDOW: Duration = Duration::from_secs(5);

/// Per-room recent-message tracker.
///
/// Keys are normalized message bodies (lowercased, trimmed). Stale entries
/// are swept lazily on each check, so memory stays proportional to recent
/// chat volume.
pub struct ChatDedupe {
    window: Duration,
    recent: Mutex<HashMap<RoomId, HashMap<String, Instant>>>,
}

impl ChatDedupe {
    /// Tracker with the default window.
    pub fn new() -> Self {
        Self::with_window(DUPLICATE_WINDOW)
    }

    /// Tracker with a custom window.
    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            recent: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether `content` repeats a recent message in `room_id`, and
    /// record it if not.
    ///
    /// Returns `true` when the message is a duplicate and should be
    /// suppressed.
    pub fn is_duplicate(&self, room_id: &RoomId, content: &str) -> bool {
        let key = content.trim().to_lowercase();
        let now = Instant::now();
        let mut recent = self.recent.lock();

        let room = recent.entry(room_id.clone()).or_default();
        room.retain(|_, seen| now.duration_since(*seen) <= self.window);

        if room.contains_key(&key) {
            return true;
        }
        let _ = room.insert(key, now);
        false
    }

    /// Drop tracking state for a room (on teardown).
    pub fn forget_room(&self, room_id: &RoomId) {
        let _ = self.recent.lock().remove(room_id);
    }
}

impl Default for ChatDedupe {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_is_not_duplicate() {
        let dedupe = ChatDedupe::new();
        assert!(!dedupe.is_duplicate(&RoomId::from("r1"), "hello"));
    }

    #[test]
    fn repeat_within_window_is_duplicate() {
        let dedupe = ChatDedupe::new();
        let room = RoomId::from("r1");
        assert!(!dedupe.is_duplicate(&room, "hello"));
        assert!(dedupe.is_duplicate(&room, "hello"));
        // Normalization: case and surrounding whitespace do not matter.
        assert!(dedupe.is_duplicate(&room, "  HELLO  "));
    }

    #[test]
    fn different_rooms_do_not_share_windows() {
        let dedupe = ChatDedupe::new();
        assert!(!dedupe.is_duplicate(&RoomId::from("r1"), "hello"));
        assert!(!dedupe.is_duplicate(&RoomId::from("r2"), "hello"));
    }

    #[test]
    fn expired_entries_are_swept() {
        let dedupe = ChatDedupe::with_window(Duration::ZERO);
        let room = RoomId::from("r1");
        assert!(!dedupe.is_duplicate(&room, "hello"));
        std::thread::sleep(Duration::from_millis(5));
        // Window elapsed, same body allowed again.
        assert!(!dedupe.is_duplicate(&room, "hello"));
    }

    #[test]
    fn forget_room_clears_state() {
        let dedupe = ChatDedupe::new();
        let room = RoomId::from("r1");
        assert!(!dedupe.is_duplicate(&room, "hello"));
        dedupe.forget_room(&room);
        assert!(!dedupe.is_duplicate(&room, "hello"));
    }
}
