//! Voice Synthesis Adapter
//!
//! Renders announcement text either as live system speech or as a clip
//! generated by a remote AI voice provider.
//!
//! **Responsibilities:**
//! - System speech seam and its paced stand-in (`speech`)
//! - AI voice provider seam and the ElevenLabs client (`provider`)
//! - Clip cache keyed by `(voice id, text)` (`cache`)
//! - Cache lookup, generation and quota fallback (`adapter`)

pub mod adapter;
pub mod cache;
pub mod provider;
pub mod speech;

pub use adapter::{RenderedSpeech, VoiceAdapter};
pub use cache::SqliteClipCache;
pub use provider::{ElevenLabsProvider, VoiceProvider};
pub use speech::{estimate_speech_seconds, PacedSpeech, SpeechSynthesizer};
