//! # Dugout Player (dugout-player)
//!
//! Playback service for the dugout soundboard.
//!
//! **Purpose:** Play sound buttons and player announcements on a main
//! transport, audition tracks on an independent preview transport, and
//! expose both over HTTP with an SSE status feed.
//!
//! **Architecture:** Play requests get a fresh play token and run as tokio
//! tasks; media resolution, voice synthesis and audio output sit behind
//! traits so the engine runs headless or on a real device.

pub mod api;
pub mod audio;
pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod playback;
pub mod state;
pub mod voice;

pub use error::{Error, Result};
pub use playback::{PlaybackEngine, TransportStatus};
pub use state::SharedState;
