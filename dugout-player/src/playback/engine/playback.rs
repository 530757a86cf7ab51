//! Song playback - play a button, track progress, fade out
//!
//! **Responsibilities:**
//! - `play_button`: resolve, start at the clamped offset, publish progress
//! - Fade-out ramp ahead of the natural end when the button asks for one
//! - Restart at a new offset when a seek arrives (preview transport)

use super::core::PlaybackEngine;
use super::transport::Transport;
use crate::audio::Playable;
use crate::db::settings::RuntimeSettings;
use crate::error::{Error, Result};
use dugout_common::fade_curves::FadeRamp;
use dugout_common::{TransportKind, TransportState};
use dugout_store::SongRef;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Timing slack for comparing elapsed time with fade and end marks
const MARK_EPSILON_SECONDS: f64 = 0.001;

/// Clamp a requested offset to `[0, duration]`
///
/// Without a known duration only the lower bound applies.
pub fn clamp_offset(requested: f64, duration: Option<f64>) -> f64 {
    let offset = if requested.is_finite() {
        requested.max(0.0)
    } else {
        0.0
    };
    match duration {
        Some(total) => offset.min(total),
        None => offset,
    }
}

/// Wait for the next seek target; never resolves without a receiver
async fn next_seek(rx: &mut Option<watch::Receiver<Option<f64>>>) -> f64 {
    if let Some(rx) = rx.as_mut() {
        while rx.changed().await.is_ok() {
            if let Some(target) = *rx.borrow_and_update() {
                return target;
            }
        }
    }
    std::future::pending().await
}

impl PlaybackEngine {
    /// Play a button on the main transport
    ///
    /// Stops whatever main is doing first. Announcement buttons run their
    /// player's announcement sequence. Returns the new play token; resolution
    /// failures are reported later as `PlaybackFailed`.
    pub async fn play_button(self: &Arc<Self>, button_id: Uuid) -> Result<u64> {
        let button = self
            .state
            .read_store(|store| store.button(button_id).cloned())?
            .ok_or_else(|| Error::NotFound(format!("button {}", button_id)))?;

        if button.is_announcement {
            if let Some(player_id) = button.player_id {
                return self.announce(player_id).await;
            }
        }

        let song = button
            .song
            .clone()
            .ok_or_else(|| Error::NotFound(format!("button '{}' has no song", button.name)))?;
        let fade_seconds = button.fade_out_enabled.then_some(button.fade_out_duration);
        let settings = self.state.settings().await;

        info!(button = %button.name, track = %song.track_id, "Play button");
        let token = self.main.begin(Some(button.id));
        let engine = Arc::clone(self);
        let handle = tokio::spawn(async move {
            engine
                .run_song(TransportKind::Main, token, song, fade_seconds, None, &settings)
                .await;
        });
        self.main.attach(token, handle);
        Ok(token)
    }

    /// Resolve and play a song under `token`, through to the end
    pub(super) async fn run_song(
        &self,
        kind: TransportKind,
        token: u64,
        song: SongRef,
        fade_seconds: Option<f64>,
        mut seek_rx: Option<watch::Receiver<Option<f64>>>,
        settings: &RuntimeSettings,
    ) {
        let transport = self.transport(kind);
        let media = match self.resolver.resolve(song.source, &song.track_id).await {
            Ok(media) => media,
            Err(e) => {
                self.fail(transport, token, e);
                return;
            }
        };

        // A seek made while loading replaces the start offset
        let requested = seek_rx
            .as_mut()
            .and_then(|rx| *rx.borrow_and_update())
            .unwrap_or(song.start_offset_seconds);
        let duration = media.known_duration();
        let offset = clamp_offset(requested, duration);

        let lane = transport.lane();
        let title = media.title.clone().or_else(|| song.title.clone());
        let artist = media.artist.clone().or_else(|| song.artist.clone());
        let artwork = media.artwork.clone().map(Arc::new);

        let started = transport.apply(token, |status, output| {
            output.start(lane, &media.playable, offset)?;
            status.state = TransportState::Playing;
            status.title = title;
            status.artist = artist;
            status.artwork = artwork;
            status.elapsed_seconds = offset;
            status.duration_seconds = duration;
            status.progress_enabled = duration.is_some();
            status.level = 1.0;
            Ok::<(), Error>(())
        });
        match started {
            None => return,
            Some(Err(e)) => {
                self.fail(transport, token, e);
                return;
            }
            Some(Ok(())) => {}
        }
        debug!(transport = %kind, offset, duration = ?duration, "Playing {}", media.playable.describe());

        if kind == TransportKind::Main {
            self.main_started(settings);
        }

        self.track(transport, token, &media.playable, duration, offset, fade_seconds, seek_rx, settings)
            .await;
    }

    /// Stop the preview transport if main playback is configured to do so
    pub(super) fn main_started(&self, settings: &RuntimeSettings) {
        if settings.stop_preview_on_main_play {
            debug!("Main started; stopping preview");
            self.preview.stop();
        }
    }

    /// Follow a playing track: progress ticks, fade, natural end, seeks
    #[allow(clippy::too_many_arguments)]
    async fn track(
        &self,
        transport: &Transport,
        token: u64,
        playable: &Playable,
        duration: Option<f64>,
        offset: f64,
        fade_seconds: Option<f64>,
        mut seek_rx: Option<watch::Receiver<Option<f64>>>,
        settings: &RuntimeSettings,
    ) {
        let period = Duration::from_millis(settings.progress_interval_ms)
            .as_secs_f64()
            .max(MARK_EPSILON_SECONDS);
        let mut base = offset;
        let mut clock = Instant::now();

        loop {
            let elapsed = base + clock.elapsed().as_secs_f64();

            let wait = match duration {
                Some(total) => {
                    let fade_start = fade_seconds.map(|f| (total - f.clamp(0.0, total)).max(0.0));
                    if let Some(start) = fade_start {
                        if elapsed + MARK_EPSILON_SECONDS >= start {
                            self.fade_out(transport, token, total, elapsed.min(total), settings)
                                .await;
                            return;
                        }
                    }
                    if elapsed + MARK_EPSILON_SECONDS >= total {
                        transport.finish(token);
                        return;
                    }
                    if !transport.progress(token, elapsed) {
                        return;
                    }
                    let next_mark = fade_start.unwrap_or(total);
                    Some(Duration::from_secs_f64((next_mark - elapsed).clamp(
                        MARK_EPSILON_SECONDS,
                        period,
                    )))
                }
                // Unknown length: plays until stopped
                None => None,
            };

            let sleep = async {
                match wait {
                    Some(wait) => tokio::time::sleep(wait).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = sleep => {}
                target = next_seek(&mut seek_rx) => {
                    let lane = transport.lane();
                    let position = clamp_offset(target, duration);
                    let restarted = transport.apply(token, |status, output| {
                        output.start(lane, playable, position)?;
                        status.elapsed_seconds = position;
                        status.level = 1.0;
                        Ok::<(), Error>(())
                    });
                    match restarted {
                        None => return,
                        Some(Err(e)) => {
                            self.fail(transport, token, e);
                            return;
                        }
                        Some(Ok(())) => {}
                    }
                    debug!(transport = %transport.kind(), position, "Seek applied");
                    base = position;
                    clock = Instant::now();
                }
            }
        }
    }

    /// Ramp the level to silence over the rest of the track, then stop
    async fn fade_out(
        &self,
        transport: &Transport,
        token: u64,
        total: f64,
        elapsed: f64,
        settings: &RuntimeSettings,
    ) {
        let entered = transport.apply(token, |status, _| {
            status.state = TransportState::Stopping;
        });
        if entered.is_none() {
            return;
        }

        let ramp = FadeRamp::new(
            settings.fade_curve,
            Duration::from_secs_f64((total - elapsed).max(0.0)),
            Duration::from_millis(settings.fade_step_ms),
        );
        let steps = ramp.step_count();
        let interval = ramp.duration() / steps;
        let lane = transport.lane();
        debug!(transport = %transport.kind(), steps, curve = %settings.fade_curve, "Fading out");

        for index in 1..=steps {
            tokio::time::sleep(interval).await;
            let level = ramp.level_at_step(index);
            let applied = transport.apply(token, |status, output| {
                output.set_level(lane, level);
                status.level = level;
            });
            if applied.is_none() {
                return;
            }
            transport.progress(token, (elapsed + interval.as_secs_f64() * index as f64).min(total));
        }

        transport.finish(token);
    }
}
