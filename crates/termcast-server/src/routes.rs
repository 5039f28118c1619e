//! Chat, teardown, and monitoring endpoints, plus router assembly.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ::metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use termcast_core::{AgentId, EventKind, RoomId};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;
use uuid::Uuid;

use crate::metrics::{
    self, CHAT_DUPLICATES_SUPPRESSED_TOTAL, CHAT_MESSAGES_TOTAL, STREAMS_ENDED_TOTAL,
};
use crate::sse;
use crate::state::AppState;

/// Body for `POST /api/agent/chat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Target room.
    pub room_id: String,
    /// Sending agent.
    pub agent_id: String,
    /// Sender display name; defaults to the agent ID.
    pub agent_name: Option<String>,
    /// Message body.
    pub message: String,
}

/// Standard success envelope.
#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    data: T,
}

/// `POST /api/agent/chat` — broadcast a chat message to a room.
///
/// The sender is excluded from the fan-out (it already has the message).
/// A message body repeated within the duplicate window is suppressed
/// rather than rebroadcast, which breaks agent echo loops.
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Response {
    if req.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "message must not be empty" })),
        )
            .into_response();
    }

    let room_id = RoomId::from(req.room_id);
    let agent_id = AgentId::from(req.agent_id);
    let agent_name = req.agent_name.unwrap_or_else(|| agent_id.to_string());

    if state.dedupe.is_duplicate(&room_id, &req.message) {
        counter!(CHAT_DUPLICATES_SUPPRESSED_TOTAL).increment(1);
        debug!(room_id = %room_id, agent_id = %agent_id, "duplicate chat suppressed");
        return Json(ApiResponse {
            success: true,
            data: json!({ "roomId": room_id, "suppressed": true }),
        })
        .into_response();
    }

    let message_id = Uuid::now_v7().to_string();
    state.broadcaster.broadcast(
        &room_id,
        EventKind::Chat,
        json!({
            "messageId": message_id,
            "agentId": agent_id,
            "agentName": agent_name,
            "content": req.message,
            "role": "agent",
        }),
        Some(&agent_id),
    );
    counter!(CHAT_MESSAGES_TOTAL).increment(1);

    Json(ApiResponse {
        success: true,
        data: json!({ "messageId": message_id, "roomId": room_id }),
    })
    .into_response()
}

/// `POST /api/rooms/{roomId}/end` — end the stream backing a room.
pub async fn end_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Response {
    let room_id = RoomId::from(room_id);
    state.controller.end_stream(&room_id, "ended");
    state.dedupe.forget_room(&room_id);
    counter!(STREAMS_ENDED_TOTAL).increment(1);

    Json(ApiResponse {
        success: true,
        data: json!({ "roomId": room_id }),
    })
    .into_response()
}

/// One row of `GET /api/rooms`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoomInfo {
    room_id: RoomId,
    subscriber_count: usize,
}

/// `GET /api/rooms` — active rooms with subscriber counts.
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Response {
    let mut rooms: Vec<RoomInfo> = state
        .controller
        .active_rooms()
        .into_iter()
        .map(|room_id| RoomInfo {
            subscriber_count: state.controller.subscriber_count(&room_id),
            room_id,
        })
        .collect();
    rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));

    Json(ApiResponse {
        success: true,
        data: rooms,
    })
    .into_response()
}

/// `GET /api/stats` — global subscriber totals.
pub async fn stats(State(state): State<Arc<AppState>>) -> Response {
    Json(ApiResponse {
        success: true,
        data: json!({
            "activeRooms": state.controller.active_rooms().len(),
            "totalSubscribers": state.controller.total_subscriber_count(),
        }),
    })
    .into_response()
}

/// `GET /metrics` — Prometheus text exposition.
pub async fn render_metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => metrics::render(handle).into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// `GET /healthz` — liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}

/// Assemble the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/agent/events", get(sse::subscribe))
        .route("/api/agent/chat", post(post_chat))
        .route("/api/rooms", get(list_rooms))
        .route("/api/rooms/{roomId}/end", post(end_room))
        .route("/api/stats", get(stats))
        .route("/metrics", get(render_metrics))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ServerSettings;
    use crate::sse::open_subscription;

    fn test_state() -> Arc<AppState> {
        AppState::new(ServerSettings::default(), None)
    }

    fn subscribe(state: &Arc<AppState>, room: &str, agent: &str) -> crate::sse::OpenSubscription {
        let mut open = open_subscription(
            state,
            RoomId::from(room),
            AgentId::from(agent),
            format!("Agent {agent}"),
        );
        // Skip the connected confirmation so tests see broadcasts only.
        let _ = open.rx.try_recv().unwrap();
        open
    }

    #[tokio::test]
    async fn chat_reaches_other_subscribers_not_sender() {
        let state = test_state();
        let mut sender = subscribe(&state, "r1", "alice");
        let mut peer = subscribe(&state, "r1", "bob");
        let _ = sender.rx.try_recv().unwrap(); // bob's join notice

        let response = post_chat(
            State(Arc::clone(&state)),
            Json(ChatRequest {
                room_id: "r1".into(),
                agent_id: "alice".into(),
                agent_name: Some("Alice".into()),
                message: "hello room".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let frame = peer.rx.try_recv().unwrap();
        assert!(frame.starts_with("event: chat\n"));
        assert!(frame.contains("\"content\":\"hello room\""));
        assert!(frame.contains("\"agentName\":\"Alice\""));
        assert!(sender.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn chat_to_empty_room_is_ok() {
        let state = test_state();
        let response = post_chat(
            State(state),
            Json(ChatRequest {
                room_id: "ghost".into(),
                agent_id: "a".into(),
                agent_name: None,
                message: "anyone?".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_chat_is_rejected() {
        let state = test_state();
        let response = post_chat(
            State(state),
            Json(ChatRequest {
                room_id: "r1".into(),
                agent_id: "a".into(),
                agent_name: None,
                message: "   ".into(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_chat_is_suppressed() {
        let state = test_state();
        let mut peer = subscribe(&state, "r1", "bob");

        for _ in 0..2 {
            let _ = post_chat(
                State(Arc::clone(&state)),
                Json(ChatRequest {
                    room_id: "r1".into(),
                    agent_id: "alice".into(),
                    agent_name: None,
                    message: "same thing".into(),
                }),
            )
            .await;
        }

        assert!(peer.rx.try_recv().is_ok());
        assert!(peer.rx.try_recv().is_err(), "second copy must be suppressed");
    }

    #[tokio::test]
    async fn end_room_clears_and_notifies() {
        let state = test_state();
        let mut open = subscribe(&state, "r1", "a");

        let response = end_room(State(Arc::clone(&state)), Path("r1".to_owned())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let frame = open.rx.try_recv().unwrap();
        assert!(frame.starts_with("event: stream_end\n"));
        assert!(open.closed.is_cancelled());
        assert!(state.controller.active_rooms().is_empty());
    }

    #[tokio::test]
    async fn router_builds() {
        let _router = router(test_state());
    }
}
