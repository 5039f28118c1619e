//! Branded ID newtypes.
//!
//! Rooms and agents are both identified by opaque strings on the wire.
//! Wrapping them in distinct newtypes keeps the two from being swapped at
//! call sites (`remove_subscriber(room, agent)` takes both).

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! branded_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// View as `&str`.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Unwrap into the underlying `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

branded_id! {
    /// Identifies one room (one live stream).
    RoomId
}

branded_id! {
    /// Identifies one agent or viewer.
    AgentId
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_inner() {
        let room = RoomId::from("r1");
        assert_eq!(room.to_string(), "r1");
        assert_eq!(room.as_str(), "r1");
    }

    #[test]
    fn serde_is_transparent() {
        let agent = AgentId::from("agent_42");
        let json = serde_json::to_string(&agent).unwrap();
        assert_eq!(json, "\"agent_42\"");
        let back: AgentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, agent);
    }

    #[test]
    fn borrow_allows_str_lookup() {
        use std::collections::HashMap;
        let mut map: HashMap<AgentId, u32> = HashMap::new();
        let _ = map.insert(AgentId::from("a"), 1);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn into_inner_round_trips() {
        let room = RoomId::new(String::from("abc"));
        assert_eq!(room.into_inner(), "abc");
    }
}
