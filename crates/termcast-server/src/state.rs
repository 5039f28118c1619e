//! Shared application state.
//!
//! One owned state container built at startup and injected into every
//! handler through axum's `State` extractor — no ambient globals. All room
//! and subscriber state lives in the registry; everything else here is
//! plumbing around it.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use termcast_rooms::{Broadcaster, RoomController, RoomRegistry};

use crate::dedupe::ChatDedupe;
use crate::settings::ServerSettings;

/// Process-wide server state.
pub struct AppState {
    /// Room → subscriber mapping, shared with broadcaster and controller.
    pub registry: Arc<RoomRegistry>,
    /// Event fan-out over the registry.
    pub broadcaster: Broadcaster,
    /// Stream teardown and room enumeration.
    pub controller: RoomController,
    /// Duplicate-chat suppression.
    pub dedupe: ChatDedupe,
    /// Runtime settings.
    pub settings: ServerSettings,
    /// Renders the `/metrics` endpoint.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build the state container from settings.
    pub fn new(settings: ServerSettings, metrics: Option<PrometheusHandle>) -> Arc<Self> {
        let registry = Arc::new(RoomRegistry::new());
        Arc::new(Self {
            broadcaster: Broadcaster::new(Arc::clone(&registry)),
            controller: RoomController::new(Arc::clone(&registry)),
            dedupe: ChatDedupe::new(),
            registry,
            settings,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_share_one_registry() {
        let state = AppState::new(ServerSettings::default(), None);
        assert!(Arc::ptr_eq(&state.registry, state.broadcaster.registry()));
        assert_eq!(state.controller.total_subscriber_count(), 0);
    }
}
