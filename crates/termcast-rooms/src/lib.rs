//! # termcast-rooms
//!
//! The real-time room-broadcast core: long-lived subscriber connections
//! grouped into rooms, event fan-out, liveness detection, and teardown.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `sink` | Transport sink capability trait + bounded-channel implementation |
//! | `subscriber` | Per-connection handle: identity, sink, heartbeat slot |
//! | `registry` | Room → agent → handle mapping, one live handle per pair |
//! | `broadcast` | Fan-out: serialize once, deliver to a snapshot, evict the dead |
//! | `heartbeat` | Periodic keep-alive ticks per connection |
//! | `lifecycle` | Stream-end teardown and room enumeration |
//!
//! ## Data Flow
//!
//! The HTTP layer validates a caller, builds a sink, and registers a
//! [`subscriber::Subscriber`] with the [`registry::RoomRegistry`]. Chat and
//! presence writes go through the [`broadcast::Broadcaster`], which pushes a
//! framed event to every current subscriber of the room. Write failures
//! route back into the registry as removals. Stream end goes through the
//! [`lifecycle::RoomController`], which notifies the room and clears it.
//!
//! All state is in-memory and process-local; clients rebuild it by
//! reconnecting.

#![deny(unsafe_code)]

pub mod broadcast;
pub mod heartbeat;
pub mod lifecycle;
pub mod registry;
pub mod sink;
pub mod subscriber;

pub use broadcast::Broadcaster;
pub use heartbeat::{start_heartbeat, HeartbeatHandle, DEFAULT_HEARTBEAT_INTERVAL};
pub use lifecycle::RoomController;
pub use registry::RoomRegistry;
pub use sink::{ChannelSink, EventSink};
pub use subscriber::Subscriber;
