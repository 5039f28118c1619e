//! The long-lived event-stream endpoint.
//!
//! `GET /api/agent/events?roomId=…&agentId=…&agentName=…` upgrades the
//! request into an SSE stream: the caller immediately receives a
//! `connected` confirmation, existing room members get an `agent_connected`
//! notice (sender excluded), and a per-connection heartbeat keeps
//! intermediaries from idling the socket out. Client disconnects, heartbeat
//! failures, and room teardown all converge on the same cleanup path.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::StreamExt;
use metrics::{counter, gauge};
use serde::Deserialize;
use serde_json::json;
use termcast_core::{frame, AgentId, EventKind, RoomEvent, RoomId};
use termcast_rooms::{start_heartbeat, ChannelSink, Subscriber};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::metrics::{SSE_CONNECTIONS_ACTIVE, SSE_CONNECTIONS_TOTAL, SSE_DISCONNECTIONS_TOTAL};
use crate::state::AppState;

/// Query parameters for the subscribe endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeParams {
    /// Room to subscribe to.
    pub room_id: String,
    /// Subscribing agent.
    pub agent_id: String,
    /// Display name; defaults to the agent ID.
    pub agent_name: Option<String>,
}

/// A registered subscription plus the transport pieces the response needs.
pub struct OpenSubscription {
    /// The registered handle.
    pub subscriber: Arc<Subscriber>,
    /// Receiving half of the sink channel; drained into the response body.
    pub rx: mpsc::Receiver<Arc<str>>,
    /// Cancelled when the sink is closed (teardown, displacement).
    pub closed: CancellationToken,
}

/// Register a new subscription: build the sink, deliver the `connected`
/// confirmation, insert into the registry (displacing any prior handle for
/// the agent), notify the room, and start the heartbeat.
pub fn open_subscription(
    state: &Arc<AppState>,
    room_id: RoomId,
    agent_id: AgentId,
    agent_name: String,
) -> OpenSubscription {
    let (sink, rx) = ChannelSink::new(state.settings.sink_capacity);
    let closed = sink.closed_token();
    let sink: Arc<dyn termcast_rooms::EventSink> = Arc::new(sink);

    // Connection confirmation goes straight to the new subscriber, before
    // anything else can be queued on the sink.
    let connected = RoomEvent::new(
        EventKind::Connected,
        json!({
            "roomId": room_id,
            "agentId": agent_id,
            "agentName": agent_name,
        }),
    );
    let _ = sink.write(Arc::from(frame::encode_event_now(&connected)));

    let subscriber = Arc::new(Subscriber::new(
        room_id.clone(),
        agent_id.clone(),
        agent_name.clone(),
        sink,
    ));
    state.registry.add_subscriber(Arc::clone(&subscriber));

    // Existing members learn about the arrival; the arriving agent already
    // got its own confirmation.
    state.broadcaster.broadcast(
        &room_id,
        EventKind::AgentConnected,
        json!({
            "agentId": agent_id,
            "agentName": agent_name,
            "viewerCount": state.registry.subscriber_count(&room_id),
        }),
        Some(&agent_id),
    );

    let heartbeat_state = Arc::clone(state);
    let heartbeat = start_heartbeat(
        &subscriber,
        state.settings.heartbeat_interval(),
        move |sub| close_subscription(&heartbeat_state, &sub),
    );
    subscriber.attach_heartbeat(heartbeat);

    counter!(SSE_CONNECTIONS_TOTAL).increment(1);
    gauge!(SSE_CONNECTIONS_ACTIVE).increment(1.0);
    info!(room_id = %room_id, agent_id = %agent_id, "sse subscription opened");

    OpenSubscription {
        subscriber,
        rx,
        closed,
    }
}

/// Tear one subscription down, if it is still the live handle for its pair.
///
/// Safe to call from any of the exit paths (client disconnect, heartbeat
/// failure); only the call that actually removes the handle broadcasts the
/// `agent_disconnected` notice, so the room sees exactly one.
pub fn close_subscription(state: &Arc<AppState>, subscriber: &Arc<Subscriber>) {
    if !state.registry.remove_exact(subscriber) {
        return;
    }
    subscriber.close();
    state.broadcaster.broadcast(
        &subscriber.room_id,
        EventKind::AgentDisconnected,
        json!({
            "agentId": subscriber.agent_id,
            "agentName": subscriber.agent_name,
        }),
        None,
    );
    info!(room_id = %subscriber.room_id, agent_id = %subscriber.agent_id, "sse subscription closed");
}

/// Runs the disconnect path when the response stream is dropped.
struct ConnectionGuard {
    state: Arc<AppState>,
    subscriber: Arc<Subscriber>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        close_subscription(&self.state, &self.subscriber);
        counter!(SSE_DISCONNECTIONS_TOTAL).increment(1);
        gauge!(SSE_CONNECTIONS_ACTIVE).decrement(1.0);
    }
}

/// `GET /api/agent/events` — subscribe to a room's real-time events.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SubscribeParams>,
) -> Response {
    let room_id = RoomId::from(params.room_id);
    let agent_id = AgentId::from(params.agent_id);
    let agent_name = params.agent_name.unwrap_or_else(|| agent_id.to_string());

    let open = open_subscription(&state, room_id, agent_id, agent_name);
    let guard = ConnectionGuard {
        state,
        subscriber: open.subscriber,
    };

    // Drain the sink channel into the chunked response until the sink is
    // closed; dropping the stream (client gone) runs the guard.
    let body = ReceiverStream::new(open.rx)
        .take_until(open.closed.cancelled_owned())
        .map(move |frame| {
            let _ = &guard;
            Ok::<_, Infallible>(Bytes::copy_from_slice(frame.as_bytes()))
        });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header("x-accel-buffering", "no")
        .body(Body::from_stream(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
