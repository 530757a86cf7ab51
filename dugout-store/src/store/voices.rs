//! Voice operations and default song settings
//!
//! Voice edits that change which voice a player resolves to refresh the
//! voice snapshot on the affected announcement buttons. Spoken text is only
//! rewritten by `update_player_sound`.

use super::{require_name, require_seconds, DataStore};
use crate::error::{Error, Result};
use crate::model::{DefaultSongSettings, Player, Voice};
use tracing::{debug, info};
use uuid::Uuid;

impl DataStore {
    pub fn add_voice(&mut self, mut voice: Voice) -> Result<Voice> {
        voice.name = require_name(&voice.name, "voice")?;
        validate_voice(&voice)?;
        if voice.id.is_nil() {
            voice.id = Uuid::new_v4();
        } else if self.voice(voice.id).is_some() {
            return Err(Error::InvalidInput(format!("voice {} already exists", voice.id)));
        }

        self.voices.push(voice.clone());
        info!(voice = %voice.id, name = %voice.name, kind = ?voice.kind, "Added voice");
        self.commit();
        Ok(voice)
    }

    pub fn update_voice(&mut self, voice: Voice) -> Result<Voice> {
        let index = self.voice_index(voice.id)?;
        let name = require_name(&voice.name, "voice")?;
        validate_voice(&voice)?;

        self.voices[index] = Voice { name, ..voice };
        let updated = self.voices[index].clone();
        self.refresh_announcement_voices();

        self.commit();
        Ok(updated)
    }

    /// Delete a voice, clearing every team assignment and player override
    /// that referenced it
    pub fn delete_voice(&mut self, id: Uuid) -> Result<()> {
        let index = self.voice_index(id)?;
        self.voices.remove(index);

        let mut cleared = 0usize;
        for event in &mut self.events {
            if event.voice_id == Some(id) {
                event.voice_id = None;
                cleared += 1;
            }
        }
        for player in &mut self.players {
            if player.voice_override == Some(id) {
                player.voice_override = None;
            }
        }
        self.refresh_announcement_voices();

        info!(voice = %id, teams_cleared = cleared, "Deleted voice");
        self.commit();
        Ok(())
    }

    /// Assign `voice_id` to a team; `None` removes the association
    pub fn assign_voice_to_team(&mut self, voice_id: Option<Uuid>, team_id: Uuid) -> Result<()> {
        let index = self.event_index(team_id)?;
        if let Some(id) = voice_id {
            self.voice_index(id)?;
        }

        self.events[index].voice_id = voice_id;
        self.refresh_announcement_voices();

        debug!(team = %team_id, voice = ?voice_id, "Assigned team voice");
        self.commit();
        Ok(())
    }

    /// Voice used for a player: override, else team voice, else neutral
    pub fn effective_voice(&self, player: &Player) -> Voice {
        player
            .voice_override
            .and_then(|id| self.voice(id))
            .or_else(|| {
                self.event(player.team_event_id)
                    .and_then(|team| team.voice_id)
                    .and_then(|id| self.voice(id))
            })
            .cloned()
            .unwrap_or_else(Voice::neutral)
    }

    pub fn set_default_song_settings(&mut self, settings: DefaultSongSettings) -> Result<()> {
        require_seconds(settings.fade_out_duration, "fade_out_duration")?;
        self.require_categories(&settings.category_ids)?;

        self.defaults = settings;
        self.commit();
        Ok(())
    }

    /// Point every announcement button at its owner's current effective voice
    pub(crate) fn refresh_announcement_voices(&mut self) {
        let voices: Vec<(Uuid, Voice)> = self
            .players
            .iter()
            .filter_map(|p| p.announcement_sound_id.map(|b| (b, self.effective_voice(p))))
            .collect();

        for (button_id, voice) in voices {
            if let Some(announcement) = self
                .buttons
                .iter_mut()
                .find(|b| b.id == button_id)
                .and_then(|b| b.announcement.as_mut())
            {
                announcement.voice = voice;
            }
        }
    }
}

fn validate_voice(voice: &Voice) -> Result<()> {
    if !(0.0..=1.0).contains(&voice.rate) {
        return Err(Error::InvalidInput(format!("voice rate {} outside 0.0..=1.0", voice.rate)));
    }
    if !(0.5..=2.0).contains(&voice.pitch) {
        return Err(Error::InvalidInput(format!("voice pitch {} outside 0.5..=2.0", voice.pitch)));
    }
    if !(0.0..=1.0).contains(&voice.volume) {
        return Err(Error::InvalidInput(format!("voice volume {} outside 0.0..=1.0", voice.volume)));
    }
    require_seconds(voice.pre_delay_seconds, "pre_delay_seconds")?;
    require_seconds(voice.post_delay_seconds, "post_delay_seconds")?;
    Ok(())
}
