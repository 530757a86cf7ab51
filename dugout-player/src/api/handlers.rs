//! HTTP request handlers
//!
//! Implements the REST control endpoints. Play requests answer `202
//! Accepted` with the play token as soon as the transport has entered
//! `Loading`; the outcome arrives on the event stream.

use crate::api::server::AppContext;
use crate::error::Error;
use crate::playback::TransportStatus;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use dugout_common::human_time::{format_clock, format_remaining};
use dugout_common::TransportKind;
use dugout_store::roster;
use dugout_store::{BoardView, MusicSource, Player, RosterCandidate, SongRef, Voice};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

type ApiError = (StatusCode, Json<StatusResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayResponse {
    pub status: String,
    pub token: u64,
}

/// Transport status plus display strings
#[derive(Debug, Serialize)]
pub struct TransportView {
    #[serde(flatten)]
    status: TransportStatus,
    has_artwork: bool,
    elapsed_display: String,
    duration_display: Option<String>,
    remaining_display: Option<String>,
}

impl From<TransportStatus> for TransportView {
    fn from(status: TransportStatus) -> Self {
        let duration = status.duration_seconds.filter(|_| status.progress_enabled);
        Self {
            has_artwork: status.has_artwork(),
            elapsed_display: format_clock(status.elapsed_seconds),
            duration_display: duration.map(format_clock),
            remaining_display: format_remaining(status.elapsed_seconds, duration),
            status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlaybackStatusResponse {
    main: TransportView,
    preview: TransportView,
}

#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    category: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewPlayRequest {
    #[serde(default)]
    source: MusicSource,
    track_id: String,
    #[serde(default)]
    start_offset_seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    position_seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct VoicePreviewRequest {
    text: String,
    /// Stored voice to speak with
    #[serde(default)]
    voice_id: Option<Uuid>,
    /// Unsaved voice settings being edited; wins over `voice_id`
    #[serde(default)]
    voice: Option<Voice>,
}

#[derive(Debug, Deserialize)]
pub struct RosterParseRequest {
    lines: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RosterImportRequest {
    team_event_id: Uuid,
    candidates: Vec<RosterCandidate>,
}

// ============================================================================
// Error mapping
// ============================================================================

fn error_response(e: Error) -> ApiError {
    let status = match &e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Store(store_error) => match store_error {
            dugout_store::Error::NotFound { .. } => StatusCode::NOT_FOUND,
            dugout_store::Error::CannotDeleteLastScope
            | dugout_store::Error::DuplicateName(_) => StatusCode::CONFLICT,
            dugout_store::Error::IndexOutOfRange { .. }
            | dugout_store::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        Error::PermissionDenied(_) => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Request failed: {}", e);
    } else {
        warn!("Request rejected: {}", e);
    }

    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

fn ok() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

fn accepted(token: u64) -> (StatusCode, Json<PlayResponse>) {
    (
        StatusCode::ACCEPTED,
        Json(PlayResponse {
            status: "accepted".to_string(),
            token,
        }),
    )
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "dugout_player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Board Endpoints
// ============================================================================

/// GET /board - Categories, buttons and players for the selected event
///
/// `?category=<id>` narrows the buttons to that category.
pub async fn get_board(
    State(ctx): State<AppContext>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<BoardView>, ApiError> {
    let board = match query.category {
        Some(category) => ctx
            .state
            .read_store(|store| store.board_in_category(category))
            .map_err(error_response)?
            .map_err(|e| error_response(e.into()))?,
        None => ctx
            .state
            .read_store(|store| store.board())
            .map_err(error_response)?,
    };
    Ok(Json(board))
}

/// POST /team-events/:id/select - Switch the selected team event
pub async fn select_team_event(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    ctx.state
        .with_store(|store| store.select_event(id))
        .map_err(error_response)?;
    info!(event = %id, "Team event selected");
    Ok(ok())
}

// ============================================================================
// Main Transport Endpoints
// ============================================================================

/// POST /buttons/:id/play - Play a sound button on the main transport
pub async fn play_button(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<PlayResponse>), ApiError> {
    let token = ctx.engine.play_button(id).await.map_err(error_response)?;
    Ok(accepted(token))
}

/// POST /players/:id/announce - Announce a player, then their walk-up song
pub async fn announce_player(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<PlayResponse>), ApiError> {
    let token = ctx.engine.announce(id).await.map_err(error_response)?;
    Ok(accepted(token))
}

/// POST /playback/stop - Stop the main transport
pub async fn stop_playback(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.engine.stop();
    ok()
}

/// GET /playback/status - Both transports with display clocks
pub async fn get_playback_status(State(ctx): State<AppContext>) -> Json<PlaybackStatusResponse> {
    Json(PlaybackStatusResponse {
        main: ctx.engine.status(TransportKind::Main).into(),
        preview: ctx.engine.status(TransportKind::Preview).into(),
    })
}

/// GET /playback/artwork - Artwork of the main transport's current track
pub async fn get_artwork(State(ctx): State<AppContext>) -> axum::response::Response {
    match ctx.engine.status(TransportKind::Main).artwork {
        Some(bytes) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes.as_ref().clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ============================================================================
// Preview Transport Endpoints
// ============================================================================

/// POST /preview/play - Audition a track on the preview transport
pub async fn preview_play(
    State(ctx): State<AppContext>,
    Json(req): Json<PreviewPlayRequest>,
) -> (StatusCode, Json<PlayResponse>) {
    let song = SongRef::new(req.source, req.track_id).with_offset(req.start_offset_seconds);
    let token = ctx.engine.preview_play(song).await;
    accepted(token)
}

/// POST /preview/seek - Move preview playback
pub async fn preview_seek(
    State(ctx): State<AppContext>,
    Json(req): Json<SeekRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    if ctx.engine.preview_seek(req.position_seconds) {
        Ok(ok())
    } else {
        Err((
            StatusCode::CONFLICT,
            Json(StatusResponse {
                status: "error: preview is not playing".to_string(),
            }),
        ))
    }
}

/// POST /preview/stop - Stop the preview transport
pub async fn preview_stop(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.engine.preview_stop();
    ok()
}

// ============================================================================
// Voice Preview Endpoints
// ============================================================================

/// POST /voice/preview - Speak text with a voice, outside both transports
pub async fn voice_preview(
    State(ctx): State<AppContext>,
    Json(req): Json<VoicePreviewRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    let voice = match (req.voice, req.voice_id) {
        (Some(voice), _) => voice,
        (None, Some(id)) => ctx
            .state
            .read_store(|store| store.voice(id).cloned())
            .map_err(error_response)?
            .ok_or_else(|| error_response(Error::NotFound(format!("voice {}", id))))?,
        (None, None) => Voice::neutral(),
    };

    ctx.engine.preview_voice(req.text, voice).await;
    Ok((
        StatusCode::ACCEPTED,
        Json(StatusResponse {
            status: "accepted".to_string(),
        }),
    ))
}

/// POST /voice/stop - Cut off a voice preview
pub async fn voice_stop(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.engine.stop_speaking();
    ok()
}

// ============================================================================
// Roster Endpoints
// ============================================================================

/// POST /roster/parse - Extract player candidates from recognized text lines
pub async fn parse_roster(Json(req): Json<RosterParseRequest>) -> Json<Vec<RosterCandidate>> {
    Json(roster::parse_roster(&req.lines))
}

/// POST /roster/import - Create a player per accepted candidate
pub async fn import_roster(
    State(ctx): State<AppContext>,
    Json(req): Json<RosterImportRequest>,
) -> Result<(StatusCode, Json<Vec<Player>>), ApiError> {
    let players = ctx
        .state
        .with_store(|store| store.import_roster(req.team_event_id, &req.candidates))
        .map_err(error_response)?;
    info!(team = %req.team_event_id, count = players.len(), "Roster imported");
    Ok((StatusCode::CREATED, Json(players)))
}
