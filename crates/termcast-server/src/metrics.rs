//! Prometheus metrics recorder and `/metrics` endpoint support.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Must be called once at server startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric name constants to avoid typos across crates.

/// SSE subscriptions opened total (counter).
pub const SSE_CONNECTIONS_TOTAL: &str = "sse_connections_total";
/// SSE subscriptions closed total (counter).
pub const SSE_DISCONNECTIONS_TOTAL: &str = "sse_disconnections_total";
/// Active SSE subscriptions (gauge).
pub const SSE_CONNECTIONS_ACTIVE: &str = "sse_connections_active";
/// Broadcast frames dropped for slow subscribers (counter).
pub const ROOM_BROADCAST_DROPS_TOTAL: &str = "room_broadcast_drops_total";
/// Subscribers evicted on dead sinks (counter).
pub const ROOM_BROADCAST_EVICTIONS_TOTAL: &str = "room_broadcast_evictions_total";
/// Chat messages broadcast total (counter).
pub const CHAT_MESSAGES_TOTAL: &str = "chat_messages_total";
/// Chat messages suppressed as duplicates (counter).
pub const CHAT_DUPLICATES_SUPPRESSED_TOTAL: &str = "chat_duplicates_suppressed_total";
/// Streams ended total (counter).
pub const STREAMS_ENDED_TOTAL: &str = "streams_ended_total";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_and_render() {
        // Build a recorder + handle (no global install to avoid test conflicts).
        let handle = PrometheusBuilder::new().build_recorder().handle();

        // Should produce valid (possibly empty) Prometheus text.
        let output = handle.render();
        assert!(output.is_empty() || output.contains('#') || output.contains('\n'));
    }

    #[test]
    fn metric_constants_are_snake_case() {
        let names = [
            SSE_CONNECTIONS_TOTAL,
            SSE_DISCONNECTIONS_TOTAL,
            SSE_CONNECTIONS_ACTIVE,
            ROOM_BROADCAST_DROPS_TOTAL,
            ROOM_BROADCAST_EVICTIONS_TOTAL,
            CHAT_MESSAGES_TOTAL,
            CHAT_DUPLICATES_SUPPRESSED_TOTAL,
            STREAMS_ENDED_TOTAL,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
