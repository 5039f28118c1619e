//! # termcast-server
//!
//! The HTTP layer in front of the room-broadcast core.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `settings` | Compiled defaults + `TERMCAST_*` env overrides |
//! | `state` | Shared [`state::AppState`] injected into every handler |
//! | `sse` | Long-lived event-stream endpoint (subscribe, heartbeat, cleanup) |
//! | `routes` | Chat, room teardown, monitoring endpoints, router assembly |
//! | `dedupe` | Per-room duplicate-chat suppression window |
//! | `metrics` | Prometheus recorder and metric name constants |
//!
//! Authentication, chat persistence, and the viewer UI live elsewhere; this
//! crate only validates request shape, constructs transport sinks, and
//! delegates to `termcast-rooms`.

#![deny(unsafe_code)]

pub mod dedupe;
pub mod metrics;
pub mod routes;
pub mod settings;
pub mod sse;
pub mod state;

pub use routes::router;
pub use settings::ServerSettings;
pub use state::AppState;
