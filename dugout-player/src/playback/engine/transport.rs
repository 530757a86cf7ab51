//! Transport state machine
//!
//! Each transport owns a play token. Every request bumps it, and every
//! step of a running request (state change, output start, level update)
//! is applied only while the token it captured is still current. The
//! token check and the mutation happen together under the status watch
//! lock, so a stopped request can never touch the output afterwards.

use crate::audio::{AudioOutput, Lane};
use crate::voice::SpeechSynthesizer;
use dugout_common::events::TransportKind;
use dugout_common::{DugoutEvent, EventBus, TransportState};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Snapshot of one transport, published on every change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportStatus {
    pub transport: TransportKind,
    pub state: TransportState,
    /// Play generation; bumped by every play and stop request
    pub token: u64,
    /// Button driving main playback
    pub button_id: Option<Uuid>,
    pub title: Option<String>,
    pub artist: Option<String>,
    #[serde(skip)]
    pub artwork: Option<Arc<Vec<u8>>>,
    pub elapsed_seconds: f64,
    pub duration_seconds: Option<f64>,
    /// False when the duration is zero or unknown
    pub progress_enabled: bool,
    pub level: f32,
}

impl TransportStatus {
    pub fn idle(transport: TransportKind) -> Self {
        Self {
            transport,
            state: TransportState::Idle,
            token: 0,
            button_id: None,
            title: None,
            artist: None,
            artwork: None,
            elapsed_seconds: 0.0,
            duration_seconds: None,
            progress_enabled: false,
            level: 1.0,
        }
    }

    pub fn has_artwork(&self) -> bool {
        self.artwork.is_some()
    }

    /// Back to idle, keeping identity and token
    fn clear(&mut self) {
        let token = self.token;
        *self = Self {
            token,
            ..Self::idle(self.transport)
        };
    }
}

pub(crate) struct Transport {
    kind: TransportKind,
    status: watch::Sender<TransportStatus>,
    task: Mutex<Option<JoinHandle<()>>>,
    /// Latest requested seek; watch coalesces bursts to the last value
    seek: watch::Sender<Option<f64>>,
    output: Arc<dyn AudioOutput>,
    speech: Arc<dyn SpeechSynthesizer>,
    bus: EventBus,
}

impl Transport {
    pub(crate) fn new(
        kind: TransportKind,
        output: Arc<dyn AudioOutput>,
        speech: Arc<dyn SpeechSynthesizer>,
        bus: EventBus,
    ) -> Self {
        let (status, _) = watch::channel(TransportStatus::idle(kind));
        let (seek, _) = watch::channel(None);
        Self {
            kind,
            status,
            task: Mutex::new(None),
            seek,
            output,
            speech,
            bus,
        }
    }

    pub(crate) fn kind(&self) -> TransportKind {
        self.kind
    }

    pub(crate) fn lane(&self) -> Lane {
        Lane::from(self.kind)
    }

    pub(crate) fn status(&self) -> TransportStatus {
        self.status.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<TransportStatus> {
        self.status.subscribe()
    }

    pub(crate) fn is_current(&self, token: u64) -> bool {
        self.status.borrow().token == token
    }

    /// Stop whatever is running and enter `Loading` under a fresh token
    pub(crate) fn begin(&self, button_id: Option<Uuid>) -> u64 {
        self.seek.send_replace(None);
        let (old, status) = self.cancel(|status| {
            status.state = TransportState::Loading;
            status.button_id = button_id;
        });
        debug!(transport = %self.kind, token = status.token, "Transport begin");
        self.publish(old, &status, true);
        status.token
    }

    /// Force `Idle` from any state, cancelling in-flight work
    pub(crate) fn stop(&self) {
        let (old, status) = self.cancel(|_| {});
        if old != TransportState::Idle {
            debug!(transport = %self.kind, token = status.token, "Transport stopped");
            self.publish(old, &status, false);
        }
    }

    /// Abort the running task, silence the lane, bump the token and reset
    /// status, then apply `f`
    fn cancel<F>(&self, f: F) -> (TransportState, TransportStatus)
    where
        F: FnOnce(&mut TransportStatus),
    {
        let mut task = match self.task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = task.take() {
            handle.abort();
        }

        let mut old = TransportState::Idle;
        self.status.send_modify(|status| {
            old = status.state;
            status.token += 1;
            self.output.stop(self.lane());
            status.clear();
            f(status);
        });
        self.speech.stop(self.lane());
        (old, self.status.borrow().clone())
    }

    /// Keep the task for `token`, or abort it if the token is already stale
    pub(crate) fn attach(&self, token: u64, handle: JoinHandle<()>) {
        let mut task = match self.task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.is_current(token) {
            *task = Some(handle);
        } else {
            handle.abort();
        }
    }

    /// Run `f` against the status if `token` is still current
    ///
    /// Returns `None` for a stale token. Observers are notified and events
    /// published only when `f` ran.
    pub(crate) fn apply<R, F>(&self, token: u64, f: F) -> Option<R>
    where
        F: FnOnce(&mut TransportStatus, &dyn AudioOutput) -> R,
    {
        let mut outcome = None;
        let mut transition = None;
        self.status.send_if_modified(|status| {
            if status.token != token {
                return false;
            }
            let old = status.state;
            outcome = Some(f(status, self.output.as_ref()));
            transition = Some((old, status.clone()));
            true
        });

        if let Some((old, status)) = transition {
            if old != status.state {
                self.publish(old, &status, false);
            }
        }
        outcome
    }

    /// Silence the lane and go `Idle` if `token` is current
    pub(crate) fn finish(&self, token: u64) -> bool {
        let lane = self.lane();
        let finished = self
            .apply(token, |status, output| {
                output.stop(lane);
                status.clear();
            })
            .is_some();
        if finished {
            debug!(transport = %self.kind, token, "Playback finished");
        }
        finished
    }

    /// Record elapsed time and emit progress if `token` is current
    pub(crate) fn progress(&self, token: u64, elapsed_seconds: f64) -> bool {
        let reported = self.apply(token, |status, _| {
            status.elapsed_seconds = elapsed_seconds;
            status.duration_seconds.filter(|_| status.progress_enabled)
        });
        match reported {
            Some(Some(duration_seconds)) => {
                self.bus.emit_lossy(DugoutEvent::PlaybackProgress {
                    transport: self.kind,
                    elapsed_seconds,
                    duration_seconds,
                });
                true
            }
            Some(None) => true,
            None => false,
        }
    }

    /// Record a seek request; false when nothing is playing
    pub(crate) fn request_seek(&self, seconds: f64) -> bool {
        if !self.status.borrow().state.is_active() {
            return false;
        }
        self.seek.send_replace(Some(seconds));
        true
    }

    pub(crate) fn seek_receiver(&self) -> watch::Receiver<Option<f64>> {
        self.seek.subscribe()
    }

    fn publish(&self, old: TransportState, status: &TransportStatus, force: bool) {
        if !force && old == status.state {
            return;
        }
        let now = chrono::Utc::now();
        self.bus.emit_lossy(DugoutEvent::TransportStateChanged {
            transport: self.kind,
            old_state: old,
            new_state: status.state,
            button_id: status.button_id,
            timestamp: now,
        });

        if status.state == TransportState::Playing && old != TransportState::Playing {
            self.bus.emit_lossy(DugoutEvent::NowPlaying {
                transport: self.kind,
                button_id: status.button_id,
                title: status.title.clone(),
                artist: status.artist.clone(),
                duration_seconds: status.duration_seconds,
                timestamp: now,
            });
        }
    }
}
