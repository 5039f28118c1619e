//! Server binary: tracing, metrics, router, serve.

use std::sync::Arc;

use anyhow::Context;
use termcast_server::{metrics, router, AppState, ServerSettings};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "termcast_server=debug,termcast_rooms=debug,tower_http=debug,info".into()
        }))
        .init();

    let settings = ServerSettings::load().context("failed to load settings")?;
    let metrics_handle = metrics::install_recorder();
    let state: Arc<AppState> = AppState::new(settings.clone(), Some(metrics_handle));

    let listener = tokio::net::TcpListener::bind(settings.bind_addr())
        .await
        .with_context(|| format!("failed to bind to {}", settings.bind_addr()))?;
    info!(addr = %settings.bind_addr(), "termcast server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("server error")?;

    Ok(())
}
