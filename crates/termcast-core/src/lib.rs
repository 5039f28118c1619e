//! # termcast-core
//!
//! Foundation types for the Termcast room-broadcast subsystem.
//!
//! This crate provides the shared vocabulary the rooms and server crates
//! depend on:
//!
//! - **Branded IDs**: [`ids::RoomId`], [`ids::AgentId`] as newtypes
//! - **Events**: [`events::EventKind`] vocabulary and [`events::RoomEvent`]
//! - **Wire framing**: [`frame`] — SSE `event:`/`data:` text frames
//! - **Errors**: [`errors::TermcastError`] hierarchy via `thiserror`
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other termcast crates.

#![deny(unsafe_code)]

pub mod errors;
pub mod events;
pub mod frame;
pub mod ids;

pub use errors::{SinkError, TermcastError};
pub use events::{EventKind, RoomEvent};
pub use ids::{AgentId, RoomId};
