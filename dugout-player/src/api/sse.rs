//! Server-Sent Events (SSE) broadcaster
//!
//! Streams transport and store events to connected clients. A new client
//! first receives the current status of both transports, then live events.

use crate::api::server::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use dugout_common::TransportKind;
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// SSE event name for the initial status frames
const STATUS_EVENT: &str = "TransportStatus";

/// GET /events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    // Subscribe before reading status so nothing falls in between
    let mut rx = ctx.state.subscribe_events();
    let initial = [
        ctx.engine.status(TransportKind::Main),
        ctx.engine.status(TransportKind::Preview),
    ];

    let stream = async_stream::stream! {
        for status in initial {
            match serde_json::to_string(&status) {
                Ok(json) => yield Ok(Event::default().event(STATUS_EVENT).data(json)),
                Err(e) => warn!("Failed to serialize transport status: {}", e),
            }
        }

        loop {
            match rx.recv().await {
                Ok(event) => {
                    let event_type = event.event_type();
                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            debug!("Broadcasting SSE event: {}", event_type);
                            yield Ok(Event::default().event(event_type).data(json));
                        }
                        Err(e) => warn!("Failed to serialize event {}: {}", event_type, e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE client lagged; {} events dropped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
