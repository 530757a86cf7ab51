//! Transport-related type definitions
//!
//! Supporting types for the main/preview transport state machines.

use serde::{Deserialize, Serialize};

/// Which transport an event or status refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Primary, user-facing playback channel
    Main,
    /// Secondary channel used for auditioning while editing
    Preview,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Main => write!(f, "main"),
            TransportKind::Preview => write!(f, "preview"),
        }
    }
}

/// Transport state machine
///
/// `Idle → Loading → Playing → Idle`, with `Stopping` entered only while a
/// fade-out ramp is running.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    /// Nothing playing
    #[default]
    Idle,
    /// Resolving media or synthesizing speech
    Loading,
    /// Audio audible
    Playing,
    /// Fade-out ramp in progress
    Stopping,
}

impl TransportState {
    /// True for every state except `Idle`
    pub fn is_active(&self) -> bool {
        !matches!(self, TransportState::Idle)
    }
}

impl std::fmt::Display for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportState::Idle => write!(f, "idle"),
            TransportState::Loading => write!(f, "loading"),
            TransportState::Playing => write!(f, "playing"),
            TransportState::Stopping => write!(f, "stopping"),
        }
    }
}

/// Classification of a playback failure, reported out-of-band
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Track or voice no longer resolvable
    NotFound,
    /// Host media library access refused
    PermissionDenied,
    /// AI voice generation capped
    QuotaExceeded,
    /// Remote call failed
    Network,
    /// Anything else
    Internal,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::NotFound => write!(f, "not_found"),
            FailureKind::PermissionDenied => write!(f, "permission_denied"),
            FailureKind::QuotaExceeded => write!(f, "quota_exceeded"),
            FailureKind::Network => write!(f, "network"),
            FailureKind::Internal => write!(f, "internal"),
        }
    }
}
