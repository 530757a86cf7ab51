//! Render announcement text for a voice
//!
//! System voices speak live. AI voices are served from the clip cache when
//! possible, otherwise generated by the provider and cached. When the
//! provider is out of quota, or no provider is configured, the adapter
//! falls back to live speech and publishes `VoiceFallback`.

use super::cache::SqliteClipCache;
use super::provider::VoiceProvider;
use super::speech::estimate_speech_seconds;
use crate::db::settings::RuntimeSettings;
use crate::error::{Error, Result};
use dugout_common::{DugoutEvent, EventBus};
use dugout_store::{Voice, VoiceKind};
use lofty::file::AudioFile;
use lofty::probe::Probe;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of rendering a line of text
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedSpeech {
    /// Speak through the system synthesizer
    Live,
    /// Play a provider clip
    Clip {
        bytes: Arc<Vec<u8>>,
        duration_seconds: f64,
    },
}

/// Cache, provider and fallback policy for announcements
#[derive(Clone)]
pub struct VoiceAdapter {
    provider: Option<Arc<dyn VoiceProvider>>,
    cache: Option<SqliteClipCache>,
    bus: EventBus,
}

impl VoiceAdapter {
    pub fn new(
        provider: Option<Arc<dyn VoiceProvider>>,
        cache: Option<SqliteClipCache>,
        bus: EventBus,
    ) -> Self {
        Self {
            provider,
            cache,
            bus,
        }
    }

    /// Adapter that always speaks live
    pub fn system_only(bus: EventBus) -> Self {
        Self::new(None, None, bus)
    }

    pub async fn render(
        &self,
        text: &str,
        voice: &Voice,
        settings: &RuntimeSettings,
    ) -> Result<RenderedSpeech> {
        if voice.kind == VoiceKind::System {
            return Ok(RenderedSpeech::Live);
        }

        let provider = match &self.provider {
            Some(provider) => provider,
            None => {
                self.fall_back("no AI voice provider configured");
                return Ok(RenderedSpeech::Live);
            }
        };

        let cache = self.cache.as_ref().filter(|_| settings.voice_cache_enabled);
        if let Some(cache) = cache {
            match cache.get(voice.id, text).await {
                Ok(Some(bytes)) => return Ok(self.clip(bytes, text, voice, settings)),
                Ok(None) => {}
                Err(e) => warn!("Voice clip cache read failed: {}", e),
            }
        }

        match provider.generate(text, voice).await {
            Ok(bytes) => {
                if let Some(cache) = cache {
                    if let Err(e) = cache.put(voice.id, text, &bytes).await {
                        warn!("Voice clip cache write failed: {}", e);
                    }
                }
                Ok(self.clip(bytes, text, voice, settings))
            }
            Err(Error::QuotaExceeded(detail)) => {
                self.fall_back(&format!("voice quota exceeded: {}", detail));
                Ok(RenderedSpeech::Live)
            }
            Err(e) => Err(e),
        }
    }

    fn clip(
        &self,
        bytes: Vec<u8>,
        text: &str,
        voice: &Voice,
        settings: &RuntimeSettings,
    ) -> RenderedSpeech {
        let duration_seconds = probe_clip_seconds(&bytes).unwrap_or_else(|| {
            estimate_speech_seconds(text, voice.rate, settings.speech_words_per_minute)
        });
        debug!(bytes = bytes.len(), duration_seconds, "Voice clip ready");
        RenderedSpeech::Clip {
            bytes: Arc::new(bytes),
            duration_seconds,
        }
    }

    fn fall_back(&self, reason: &str) {
        warn!("Falling back to system speech: {}", reason);
        self.bus.emit_lossy(DugoutEvent::VoiceFallback {
            reason: reason.to_string(),
            timestamp: chrono::Utc::now(),
        });
    }
}

/// Length of an encoded clip, if lofty recognizes the format
pub fn probe_clip_seconds(bytes: &[u8]) -> Option<f64> {
    let tagged_file = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    let seconds = tagged_file.properties().duration().as_secs_f64();
    (seconds > 0.0).then_some(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dugout_common::db::init_memory_database;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProvider {
        calls: AtomicUsize,
        quota_exceeded: bool,
    }

    #[async_trait]
    impl VoiceProvider for ScriptedProvider {
        async fn generate(&self, text: &str, _voice: &Voice) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.quota_exceeded {
                Err(Error::QuotaExceeded("monthly limit".into()))
            } else {
                Ok(text.as_bytes().to_vec())
            }
        }
    }

    fn ai_voice() -> Voice {
        Voice::new("Announcer", VoiceKind::AiGenerated, "abc123")
    }

    #[tokio::test]
    async fn test_system_voice_speaks_live() {
        let adapter = VoiceAdapter::system_only(EventBus::new(4));
        let rendered = adapter
            .render("hi", &Voice::neutral(), &RuntimeSettings::default())
            .await
            .unwrap();
        assert_eq!(rendered, RenderedSpeech::Live);
    }

    #[tokio::test]
    async fn test_second_render_hits_cache() {
        let provider = Arc::new(ScriptedProvider {
            calls: AtomicUsize::new(0),
            quota_exceeded: false,
        });
        let cache = SqliteClipCache::new(init_memory_database().await.unwrap());
        let adapter = VoiceAdapter::new(Some(provider.clone()), Some(cache), EventBus::new(4));
        let voice = ai_voice();
        let settings = RuntimeSettings::default();

        let first = adapter.render("Now batting", &voice, &settings).await.unwrap();
        let second = adapter.render("Now batting", &voice, &settings).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        // Not a real audio file, so the length is estimated from the text
        match first {
            RenderedSpeech::Clip { duration_seconds, .. } => {
                let expected = estimate_speech_seconds("Now batting", voice.rate, 165);
                assert!((duration_seconds - expected).abs() < 1e-9);
            }
            RenderedSpeech::Live => panic!("expected a clip"),
        }
    }

    #[tokio::test]
    async fn test_cache_disabled_regenerates() {
        let provider = Arc::new(ScriptedProvider {
            calls: AtomicUsize::new(0),
            quota_exceeded: false,
        });
        let cache = SqliteClipCache::new(init_memory_database().await.unwrap());
        let adapter = VoiceAdapter::new(Some(provider.clone()), Some(cache), EventBus::new(4));
        let settings = RuntimeSettings {
            voice_cache_enabled: false,
            ..RuntimeSettings::default()
        };

        adapter.render("x", &ai_voice(), &settings).await.unwrap();
        adapter.render("x", &ai_voice(), &settings).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_quota_exceeded_falls_back_with_event() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        let provider = Arc::new(ScriptedProvider {
            calls: AtomicUsize::new(0),
            quota_exceeded: true,
        });
        let adapter = VoiceAdapter::new(Some(provider), None, bus);

        let rendered = adapter
            .render("x", &ai_voice(), &RuntimeSettings::default())
            .await
            .unwrap();
        assert_eq!(rendered, RenderedSpeech::Live);
        match rx.recv().await.unwrap() {
            DugoutEvent::VoiceFallback { reason, .. } => assert!(reason.contains("quota")),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_probe_rejects_garbage() {
        assert!(probe_clip_seconds(b"definitely not audio").is_none());
    }
}
