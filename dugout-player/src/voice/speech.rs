//! System speech
//!
//! `SpeechSynthesizer` is the seam for on-device text-to-speech. The
//! bundled `PacedSpeech` logs the text and takes as long as a speaker at
//! the voice's rate would, which is enough to sequence announcements on a
//! headless host.

use crate::audio::Lane;
use crate::error::Result;
use async_trait::async_trait;
use dugout_store::Voice;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info};

/// Live speech engine
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text`; completes when speech ends or is stopped
    async fn speak(&self, lane: Lane, text: &str, voice: &Voice) -> Result<()>;

    /// Cut off speech on `lane`
    fn stop(&self, lane: Lane);
}

/// Estimated speaking time in seconds
///
/// `rate` 0.5 speaks at `words_per_minute`; 0.0 is half as fast and 1.0
/// half again as fast.
pub fn estimate_speech_seconds(text: &str, rate: f32, words_per_minute: u32) -> f64 {
    let words = text.split_whitespace().count();
    if words == 0 {
        return 0.0;
    }
    let pace = words_per_minute.max(1) as f64 * (0.5 + rate.clamp(0.0, 1.0) as f64);
    words as f64 * 60.0 / pace
}

/// Speech stand-in paced by word count
pub struct PacedSpeech {
    words_per_minute: u32,
    main: Notify,
    preview: Notify,
    voice: Notify,
}

impl PacedSpeech {
    pub fn new(words_per_minute: u32) -> Self {
        Self {
            words_per_minute,
            main: Notify::new(),
            preview: Notify::new(),
            voice: Notify::new(),
        }
    }

    fn stop_signal(&self, lane: Lane) -> &Notify {
        match lane {
            Lane::Main => &self.main,
            Lane::Preview => &self.preview,
            Lane::Voice => &self.voice,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for PacedSpeech {
    async fn speak(&self, lane: Lane, text: &str, voice: &Voice) -> Result<()> {
        let seconds = estimate_speech_seconds(text, voice.rate, self.words_per_minute);
        info!(%lane, voice = %voice.name, seconds, "Speaking: {}", text);

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs_f64(seconds)) => {
                debug!(%lane, "Speech finished");
            }
            _ = self.stop_signal(lane).notified() => {
                debug!(%lane, "Speech stopped");
            }
        }
        Ok(())
    }

    fn stop(&self, lane: Lane) {
        self.stop_signal(lane).notify_waiters();
    }
}
