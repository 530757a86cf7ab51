//! Output lanes and the headless tracing output

use crate::error::Result;
use dugout_common::TransportKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Independent output channel
///
/// Main and preview carry transports; the voice lane carries voice
/// previews, which never show up in transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Main,
    Preview,
    Voice,
}

impl From<TransportKind> for Lane {
    fn from(kind: TransportKind) -> Self {
        match kind {
            TransportKind::Main => Lane::Main,
            TransportKind::Preview => Lane::Preview,
        }
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lane::Main => write!(f, "main"),
            Lane::Preview => write!(f, "preview"),
            Lane::Voice => write!(f, "voice"),
        }
    }
}

/// Something an output can play
#[derive(Debug, Clone, PartialEq)]
pub enum Playable {
    /// File in the local media library
    File(PathBuf),
    /// Remote stream
    Url(String),
    /// In-memory encoded clip (AI voice rendering)
    Clip(Arc<Vec<u8>>),
}

impl Playable {
    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            Playable::File(path) => path.display().to_string(),
            Playable::Url(url) => url.clone(),
            Playable::Clip(bytes) => format!("<clip {} bytes>", bytes.len()),
        }
    }
}

/// Audio sink driven by the engine
///
/// Calls are fire-and-forget from the engine's point of view and must not
/// block. `start` replaces whatever the lane was playing.
pub trait AudioOutput: Send + Sync {
    /// Begin playing `playable` on `lane` from `offset_seconds`
    fn start(&self, lane: Lane, playable: &Playable, offset_seconds: f64) -> Result<()>;

    /// Set lane gain, 0.0 (silent) to 1.0 (full)
    fn set_level(&self, lane: Lane, level: f32);

    /// Silence the lane
    fn stop(&self, lane: Lane);
}

/// Headless output that only logs
#[derive(Debug, Default, Clone)]
pub struct TracingOutput;

impl TracingOutput {
    pub fn new() -> Self {
        Self
    }
}

impl AudioOutput for TracingOutput {
    fn start(&self, lane: Lane, playable: &Playable, offset_seconds: f64) -> Result<()> {
        info!(%lane, offset_seconds, "Output start: {}", playable.describe());
        Ok(())
    }

    fn set_level(&self, lane: Lane, level: f32) {
        debug!(%lane, level, "Output level");
    }

    fn stop(&self, lane: Lane) {
        debug!(%lane, "Output stop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_from_transport() {
        assert_eq!(Lane::from(TransportKind::Main), Lane::Main);
        assert_eq!(Lane::from(TransportKind::Preview), Lane::Preview);
    }

    #[test]
    fn test_describe_clip() {
        let clip = Playable::Clip(Arc::new(vec![0u8; 12]));
        assert_eq!(clip.describe(), "<clip 12 bytes>");
    }
}
