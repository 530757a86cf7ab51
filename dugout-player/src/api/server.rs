//! HTTP server setup and routing
//!
//! Sets up the Axum router for the control endpoints and SSE, and serves
//! it until the shutdown future resolves.

use crate::error::{Error, Result};
use crate::playback::PlaybackEngine;
use crate::state::SharedState;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<SharedState>,
    pub engine: Arc<PlaybackEngine>,
}

/// Build the router with every control route
pub fn create_router(ctx: AppContext) -> Router {
    use super::handlers;

    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health))
        // SSE event stream
        .route("/events", get(super::sse::event_stream))
        // Board for the selected team event
        .route("/board", get(handlers::get_board))
        .route("/team-events/:id/select", post(handlers::select_team_event))
        // Main transport
        .route("/buttons/:id/play", post(handlers::play_button))
        .route("/players/:id/announce", post(handlers::announce_player))
        .route("/playback/stop", post(handlers::stop_playback))
        .route("/playback/status", get(handlers::get_playback_status))
        .route("/playback/artwork", get(handlers::get_artwork))
        // Preview transport
        .route("/preview/play", post(handlers::preview_play))
        .route("/preview/seek", post(handlers::preview_seek))
        .route("/preview/stop", post(handlers::preview_stop))
        // Voice preview
        .route("/voice/preview", post(handlers::voice_preview))
        .route("/voice/stop", post(handlers::voice_stop))
        // Roster import
        .route("/roster/parse", post(handlers::parse_roster))
        .route("/roster/import", post(handlers::import_roster))
        // Attach application context
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// Run HTTP API server until `shutdown` resolves
pub async fn run<F>(port: u16, ctx: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}
