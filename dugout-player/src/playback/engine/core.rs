//! Core playback engine - construction, status and stop
//!
//! **Responsibilities:**
//! - PlaybackEngine struct definition and wiring of the seams
//! - Status accessors for both transports
//! - Stop and failure handling shared by every playback flow
//!
//! Song, announcement and preview flows live in sibling modules as further
//! `impl PlaybackEngine` blocks.

use super::transport::{Transport, TransportStatus};
use crate::audio::AudioOutput;
use crate::error::Error;
use crate::media::MediaResolver;
use crate::state::SharedState;
use crate::voice::{SpeechSynthesizer, VoiceAdapter};
use dugout_common::{DugoutEvent, TransportKind};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Playback engine - owns the main and preview transports
///
/// Shared as `Arc<PlaybackEngine>`; play requests spawn a task per request
/// and return immediately with the request's play token.
pub struct PlaybackEngine {
    pub(super) state: Arc<SharedState>,
    pub(super) resolver: Arc<dyn MediaResolver>,
    pub(super) output: Arc<dyn AudioOutput>,
    pub(super) speech: Arc<dyn SpeechSynthesizer>,
    pub(super) voice: VoiceAdapter,
    pub(super) main: Transport,
    pub(super) preview: Transport,
    /// Voice preview task, independent of both transports
    pub(super) voice_task: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackEngine {
    pub fn new(
        state: Arc<SharedState>,
        resolver: Arc<dyn MediaResolver>,
        output: Arc<dyn AudioOutput>,
        speech: Arc<dyn SpeechSynthesizer>,
        voice: VoiceAdapter,
    ) -> Arc<Self> {
        info!("Creating playback engine");
        let bus = state.bus.clone();
        Arc::new(Self {
            main: Transport::new(TransportKind::Main, output.clone(), speech.clone(), bus.clone()),
            preview: Transport::new(TransportKind::Preview, output.clone(), speech.clone(), bus),
            state,
            resolver,
            output,
            speech,
            voice,
            voice_task: Mutex::new(None),
        })
    }

    pub(super) fn transport(&self, kind: TransportKind) -> &Transport {
        match kind {
            TransportKind::Main => &self.main,
            TransportKind::Preview => &self.preview,
        }
    }

    /// Current status of a transport
    pub fn status(&self, kind: TransportKind) -> TransportStatus {
        self.transport(kind).status()
    }

    /// Follow a transport's status as it changes
    pub fn subscribe_status(&self, kind: TransportKind) -> watch::Receiver<TransportStatus> {
        self.transport(kind).subscribe()
    }

    /// Stop the main transport from any state
    pub fn stop(&self) {
        info!("Stop requested");
        self.main.stop();
    }

    /// Stop the preview transport from any state
    pub fn preview_stop(&self) {
        debug!("Preview stop requested");
        self.preview.stop();
    }

    /// Stop everything, including voice previews
    pub fn shutdown(&self) {
        self.main.stop();
        self.preview.stop();
        self.stop_speaking();
    }

    /// Abort a request: silence, go `Idle` and report the failure
    ///
    /// Failures of a superseded request are dropped silently.
    pub(super) fn fail(&self, transport: &Transport, token: u64, error: Error) {
        if !transport.finish(token) {
            debug!(transport = %transport.kind(), token, "Discarding stale failure: {}", error);
            return;
        }
        warn!(transport = %transport.kind(), "Playback failed: {}", error);
        self.state.bus.emit_lossy(DugoutEvent::PlaybackFailed {
            transport: transport.kind(),
            kind: error.failure_kind(),
            message: error.to_string(),
            timestamp: chrono::Utc::now(),
        });
    }
}
