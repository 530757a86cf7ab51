//! Player announcements on the main transport
//!
//! Sequence: render the script, pre-delay, speak or play the clip,
//! post-delay, then hand off to the walk-up song. Every step re-checks the
//! play token, so a stop or a new request tears down whatever remains.

use super::core::PlaybackEngine;
use super::transport::Transport;
use crate::audio::{Lane, Playable};
use crate::db::settings::RuntimeSettings;
use crate::error::{Error, Result};
use crate::voice::RenderedSpeech;
use dugout_common::{TransportKind, TransportState};
use dugout_store::AnnouncementPlan;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

impl PlaybackEngine {
    /// Announce a player, then play their walk-up song
    ///
    /// Returns the play token of the sequence.
    pub async fn announce(self: &Arc<Self>, player_id: Uuid) -> Result<u64> {
        let plan = self
            .state
            .with_store(|store| store.announcement_plan(player_id))?;
        let settings = self.state.settings().await;

        info!(player = %plan.title, "Announce player");
        let token = self.main.begin(Some(plan.button_id));
        self.main.apply(token, |status, _| {
            status.title = Some(plan.title.clone());
        });

        let engine = Arc::clone(self);
        let handle = tokio::spawn(async move {
            engine.run_announcement(token, plan, &settings).await;
        });
        self.main.attach(token, handle);
        Ok(token)
    }

    async fn run_announcement(&self, token: u64, plan: AnnouncementPlan, settings: &RuntimeSettings) {
        let transport = &self.main;

        let rendered = match self.voice.render(&plan.text, &plan.voice, settings).await {
            Ok(rendered) => rendered,
            Err(e) => {
                self.fail(transport, token, e);
                return;
            }
        };

        if !hold(transport, token, plan.voice.pre_delay_seconds).await {
            return;
        }

        match rendered {
            RenderedSpeech::Clip {
                bytes,
                duration_seconds,
            } => {
                let playable = Playable::Clip(bytes);
                let started = transport.apply(token, |status, output| {
                    output.start(Lane::Main, &playable, 0.0)?;
                    status.state = TransportState::Playing;
                    status.title = Some(plan.title.clone());
                    status.duration_seconds = Some(duration_seconds);
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
                self.main_started(settings);

                tokio::time::sleep(Duration::from_secs_f64(duration_seconds)).await;
                let silenced = transport.apply(token, |_, output| output.stop(Lane::Main));
                if silenced.is_none() {
                    return;
                }
            }
            RenderedSpeech::Live => {
                let started = transport.apply(token, |status, _| {
                    status.state = TransportState::Playing;
                    status.title = Some(plan.title.clone());
                });
                if started.is_none() {
                    return;
                }
                self.main_started(settings);

                if let Err(e) = self.speech.speak(Lane::Main, &plan.text, &plan.voice).await {
                    self.fail(transport, token, e);
                    return;
                }
                if !transport.is_current(token) {
                    return;
                }
            }
        }

        if !hold(transport, token, plan.voice.post_delay_seconds).await {
            return;
        }

        match plan.walk_up {
            Some(song) => {
                debug!(player = %plan.title, "Announcement done; loading walk-up song");
                let loading = transport.apply(token, |status, _| {
                    status.state = TransportState::Loading;
                    status.title = None;
                    status.duration_seconds = None;
                    status.progress_enabled = false;
                    status.elapsed_seconds = 0.0;
                });
                if loading.is_none() {
                    return;
                }
                let fade_seconds = plan.fade_out_enabled.then_some(plan.fade_out_duration);
                self.run_song(TransportKind::Main, token, song, fade_seconds, None, settings)
                    .await;
            }
            None => {
                transport.finish(token);
            }
        }
    }
}

/// Sleep for a voice delay; false if the request was superseded meanwhile
async fn hold(transport: &Transport, token: u64, seconds: f64) -> bool {
    if seconds.is_finite() && seconds > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
    }
    transport.is_current(token)
}
