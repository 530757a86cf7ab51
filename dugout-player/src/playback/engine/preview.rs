//! Preview transport and voice preview
//!
//! The preview transport runs the same song machinery as main, with seeks.
//! Voice previews play on their own lane and never appear in transport
//! status.

use super::core::PlaybackEngine;
use crate::audio::{Lane, Playable};
use crate::voice::RenderedSpeech;
use dugout_common::TransportKind;
use dugout_store::{SongRef, Voice};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

impl PlaybackEngine {
    /// Audition a song on the preview transport from its start offset
    pub async fn preview_play(self: &Arc<Self>, song: SongRef) -> u64 {
        let settings = self.state.settings().await;

        info!(track = %song.track_id, offset = song.start_offset_seconds, "Preview play");
        let token = self.preview.begin(None);
        let seek_rx = self.preview.seek_receiver();
        let engine = Arc::clone(self);
        let handle = tokio::spawn(async move {
            engine
                .run_song(TransportKind::Preview, token, song, None, Some(seek_rx), &settings)
                .await;
        });
        self.preview.attach(token, handle);
        token
    }

    /// Move preview playback to `seconds`
    ///
    /// Bursts of seeks collapse to the latest. A seek while loading becomes
    /// the start offset. Returns false when the preview is idle.
    pub fn preview_seek(&self, seconds: f64) -> bool {
        debug!(seconds, "Preview seek");
        self.preview.request_seek(seconds)
    }

    /// Speak `text` with `voice` on the voice lane, replacing any preview
    /// already speaking
    pub async fn preview_voice(self: &Arc<Self>, text: String, voice: Voice) {
        self.stop_speaking();
        let settings = self.state.settings().await;

        let engine = Arc::clone(self);
        let handle = tokio::spawn(async move {
            match engine.voice.render(&text, &voice, &settings).await {
                Ok(RenderedSpeech::Clip {
                    bytes,
                    duration_seconds,
                }) => {
                    if let Err(e) = engine.output.start(Lane::Voice, &Playable::Clip(bytes), 0.0) {
                        warn!("Voice preview failed to start: {}", e);
                        return;
                    }
                    tokio::time::sleep(Duration::from_secs_f64(duration_seconds)).await;
                    engine.output.stop(Lane::Voice);
                }
                Ok(RenderedSpeech::Live) => {
                    if let Err(e) = engine.speech.speak(Lane::Voice, &text, &voice).await {
                        warn!("Voice preview failed: {}", e);
                    }
                }
                Err(e) => warn!("Voice preview failed: {}", e),
            }
        });

        let mut task = match self.voice_task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(old) = task.replace(handle) {
            old.abort();
        }
    }

    /// Cut off a voice preview
    pub fn stop_speaking(&self) {
        let mut task = match self.voice_task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = task.take() {
            handle.abort();
        }
        self.output.stop(Lane::Voice);
        self.speech.stop(Lane::Voice);
    }
}
