//! Playback: main and preview transports, announcements, fades

pub mod engine;

pub use engine::{PlaybackEngine, TransportStatus};
