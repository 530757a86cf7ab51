//! AI voice provider client
//!
//! `VoiceProvider` turns text into an encoded audio clip. The ElevenLabs
//! client posts to `{base}/v1/text-to-speech/{voice id}` and maps refusals
//! onto the player's error kinds: exhausted quota becomes `QuotaExceeded`
//! so the adapter can fall back to system speech.

use crate::error::{Error, Result};
use async_trait::async_trait;
use dugout_store::Voice;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("dugout-player/", env!("CARGO_PKG_VERSION"));

/// Remote text-to-speech provider
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Render `text` with the provider voice named by `voice`
    async fn generate(&self, text: &str, voice: &Voice) -> Result<Vec<u8>>;
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    speed: f32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// ElevenLabs text-to-speech client
#[derive(Debug, Clone)]
pub struct ElevenLabsProvider {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model_id: String,
}

impl ElevenLabsProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model_id: model_id.into(),
        })
    }
}

/// Provider speed multiplier for a 0..1 voice rate (0.5 is normal)
fn provider_speed(rate: f32) -> f32 {
    0.7 + rate.clamp(0.0, 1.0) * 0.6
}

#[async_trait]
impl VoiceProvider for ElevenLabsProvider {
    async fn generate(&self, text: &str, voice: &Voice) -> Result<Vec<u8>> {
        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.base_url, voice.provider_voice_id
        );
        debug!(voice = %voice.name, url = %url, "Requesting AI voice clip");

        let request = GenerateRequest {
            text,
            model_id: &self.model_id,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
                speed: provider_speed(voice.rate),
            },
        };

        let response = self
            .http_client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("accept", "audio/mpeg")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            info!(voice = %voice.name, bytes = bytes.len(), "Generated AI voice clip");
            return Ok(bytes.to_vec());
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => Error::QuotaExceeded(body),
            StatusCode::UNAUTHORIZED if body.contains("quota_exceeded") => {
                Error::QuotaExceeded(body)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::PermissionDenied(format!(
                "voice provider rejected credentials: {}",
                body
            )),
            StatusCode::NOT_FOUND => {
                Error::NotFound(format!("provider voice {}", voice.provider_voice_id))
            }
            s => Error::Network(format!("voice provider returned {}: {}", s, body)),
        })
    }
}
