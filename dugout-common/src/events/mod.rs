//! Event types for the dugout event system
//!
//! Provides shared event definitions and EventBus for the store and player crates.

mod transport_types;

pub use transport_types::{FailureKind, TransportKind, TransportState};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Dugout event types
///
/// Events are broadcast via EventBus and can be serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DugoutEvent {
    /// Transport state changed
    ///
    /// Triggers:
    /// - SSE: Update transport controls and button highlight
    TransportStateChanged {
        /// Transport that changed
        transport: TransportKind,
        /// State before change
        old_state: TransportState,
        /// State after change
        new_state: TransportState,
        /// Button associated with the transport (main transport only)
        button_id: Option<Uuid>,
        /// When state changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Now-playing metadata became available
    NowPlaying {
        /// Transport that started playing
        transport: TransportKind,
        /// Button associated with playback, if any
        button_id: Option<Uuid>,
        /// Track or announcement title
        title: Option<String>,
        /// Track artist
        artist: Option<String>,
        /// Total duration in seconds (None = unknown/live)
        duration_seconds: Option<f64>,
        /// When playback started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback progress update
    ///
    /// Emitted periodically while a transport with a known duration is playing.
    PlaybackProgress {
        /// Transport reporting progress
        transport: TransportKind,
        /// Elapsed seconds within the track
        elapsed_seconds: f64,
        /// Total track duration in seconds
        duration_seconds: f64,
    },

    /// Playback aborted because a resolution or synthesis step failed
    PlaybackFailed {
        /// Transport that failed
        transport: TransportKind,
        /// Failure classification
        kind: FailureKind,
        /// Human-readable detail
        message: String,
        /// When the failure was detected
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// AI voice synthesis fell back to system speech
    VoiceFallback {
        /// Why the provider clip was not used
        reason: String,
        /// When fallback happened
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The entity graph changed and was handed to persistence
    StoreChanged {
        /// Monotonic store revision
        revision: u64,
        /// When the mutation happened
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl DugoutEvent {
    /// Event type name, used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            DugoutEvent::TransportStateChanged { .. } => "TransportStateChanged",
            DugoutEvent::NowPlaying { .. } => "NowPlaying",
            DugoutEvent::PlaybackProgress { .. } => "PlaybackProgress",
            DugoutEvent::PlaybackFailed { .. } => "PlaybackFailed",
            DugoutEvent::VoiceFallback { .. } => "VoiceFallback",
            DugoutEvent::StoreChanged { .. } => "StoreChanged",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DugoutEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<DugoutEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: DugoutEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("No subscribers for {}", e.0.event_type());
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = DugoutEvent::TransportStateChanged {
            transport: TransportKind::Main,
            old_state: TransportState::Loading,
            new_state: TransportState::Playing,
            button_id: None,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TransportStateChanged");
        assert_eq!(json["transport"], "main");
        assert_eq!(json["new_state"], "playing");
    }

    #[test]
    fn test_failure_kind_snake_case() {
        let json = serde_json::to_string(&FailureKind::PermissionDenied).unwrap();
        assert_eq!(json, "\"permission_denied\"");
    }

    #[tokio::test]
    async fn test_event_bus_delivers_to_subscriber() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit_lossy(DugoutEvent::StoreChanged {
            revision: 7,
            timestamp: chrono::Utc::now(),
        });

        match rx.recv().await.unwrap() {
            DugoutEvent::StoreChanged { revision, .. } => assert_eq!(revision, 7),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.emit_lossy(DugoutEvent::VoiceFallback {
            reason: "quota".to_string(),
            timestamp: chrono::Utc::now(),
        });

        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }
}
