//! Player operations and the derived announcement button
//!
//! Editing a player is two steps: `update_player` saves the record, then
//! `update_player_sound` re-derives the owned announcement button from the
//! saved record. The second step takes an id rather than a `Player` so it
//! can never read a stale copy.

use super::{require_name, require_seconds, DataStore};
use crate::announcement::{player_script, AnnouncementPlan};
use crate::error::{Error, Result};
use crate::model::{Announcement, Player, SoundButton};
use crate::ordering;
use crate::roster::RosterCandidate;
use tracing::{debug, info};
use uuid::Uuid;

impl DataStore {
    /// Create a player and its announcement button in one step
    ///
    /// `voice_override` takes precedence over `player.voice_override`. The
    /// player is appended to the end of its team's lineup.
    pub fn create_player(
        &mut self,
        mut player: Player,
        voice_override: Option<Uuid>,
    ) -> Result<(Player, SoundButton)> {
        player.name = require_name(&player.name, "player")?;
        self.event_index(player.team_event_id)?;
        player.voice_override = voice_override.or(player.voice_override);
        if let Some(voice_id) = player.voice_override {
            self.voice_index(voice_id)?;
        }
        validate_player_fields(&player)?;
        if player.id.is_nil() {
            player.id = Uuid::new_v4();
        } else if self.player(player.id).is_some() {
            return Err(Error::InvalidInput(format!("player {} already exists", player.id)));
        }

        let team = player.team_event_id;
        player.order = ordering::next_order(&self.players, |p| p.team_event_id == team);
        player.number = player.number.trim().to_string();

        let button = self.derive_announcement_button(&player, None);
        player.announcement_sound_id = Some(button.id);

        self.players.push(player.clone());
        self.buttons.push(button.clone());

        info!(player = %player.id, number = %player.number, name = %player.name, "Created player");
        self.commit();
        Ok((player, button))
    }

    /// Save a player record
    ///
    /// Does not touch the spoken text or walk-up song of the owned button;
    /// call [`DataStore::update_player_sound`] afterwards. Moving a player to
    /// another team appends them to that team's lineup.
    pub fn update_player(&mut self, player: Player) -> Result<Player> {
        let index = self.player_index(player.id)?;
        let name = require_name(&player.name, "player")?;
        self.event_index(player.team_event_id)?;
        if let Some(voice_id) = player.voice_override {
            self.voice_index(voice_id)?;
        }
        validate_player_fields(&player)?;

        let old_team = self.players[index].team_event_id;
        let new_team = player.team_event_id;
        let order = if old_team != new_team {
            ordering::next_order(&self.players, |p| p.team_event_id == new_team)
        } else {
            self.players[index].order
        };

        let stored = &mut self.players[index];
        stored.name = name;
        stored.number = player.number.trim().to_string();
        stored.position = player.position.filter(|p| !p.trim().is_empty());
        stored.walk_up_song = player.walk_up_song;
        stored.voice_override = player.voice_override;
        stored.team_event_id = new_team;
        stored.order = order;
        let updated = stored.clone();

        if old_team != new_team {
            ordering::compact(&mut self.players, |p| p.team_event_id == old_team);
            self.sync_announcement_orders(old_team);
        }
        self.sync_announcement_orders(new_team);

        debug!(player = %updated.id, "Updated player record");
        self.commit();
        Ok(updated)
    }

    /// Re-derive the owned announcement button from the saved player
    ///
    /// Overwrites name, text, voice and walk-up song; keeps color, fade and
    /// tags. Creates the button if the player has none.
    pub fn update_player_sound(&mut self, player_id: Uuid) -> Result<SoundButton> {
        let player = self.players[self.player_index(player_id)?].clone();

        let existing = player
            .announcement_sound_id
            .and_then(|id| self.buttons.iter().position(|b| b.id == id));

        let button = match existing {
            Some(index) => {
                let derived = self.derive_announcement_button(&player, Some(&self.buttons[index]));
                self.buttons[index] = derived.clone();
                derived
            }
            None => {
                let derived = self.derive_announcement_button(&player, None);
                self.buttons.push(derived.clone());
                if let Some(stored) = self.players.iter_mut().find(|p| p.id == player_id) {
                    stored.announcement_sound_id = Some(derived.id);
                }
                derived
            }
        };

        debug!(player = %player_id, button = %button.id, "Resynced announcement button");
        self.commit();
        Ok(button)
    }

    /// Delete a player together with the owned announcement button
    pub fn delete_player(&mut self, id: Uuid) -> Result<()> {
        let index = self.player_index(id)?;
        let removed = self.players.remove(index);
        let team = removed.team_event_id;

        self.buttons.retain(|b| {
            Some(b.id) != removed.announcement_sound_id
                && !(b.is_announcement && b.player_id == Some(id))
        });
        ordering::compact(&mut self.players, |p| p.team_event_id == team);
        self.sync_announcement_orders(team);

        info!(player = %id, name = %removed.name, "Deleted player");
        self.commit();
        Ok(())
    }

    /// Create one player per roster candidate, in candidate order
    pub fn import_roster(
        &mut self,
        team_id: Uuid,
        candidates: &[RosterCandidate],
    ) -> Result<Vec<Player>> {
        self.event_index(team_id)?;

        // Reject the whole batch before creating anyone
        let players = candidates
            .iter()
            .map(|candidate| {
                let mut player = Player::new(&candidate.name, &candidate.number, team_id);
                player.name = require_name(&player.name, "player")?;
                player.position = candidate.position.clone();
                validate_player_fields(&player)?;
                Ok(player)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut created = Vec::with_capacity(players.len());
        for player in players {
            let (player, _) = self.create_player(player, None)?;
            created.push(player);
        }

        info!(team = %team_id, count = created.len(), "Imported roster");
        Ok(created)
    }

    /// What the engine plays for a player's announcement
    ///
    /// `NotFound` if the player has no announcement button yet.
    pub fn announcement_plan(&self, player_id: Uuid) -> Result<AnnouncementPlan> {
        let player = self
            .player(player_id)
            .ok_or_else(|| Error::not_found("player", player_id))?;
        let button_id = player
            .announcement_sound_id
            .ok_or_else(|| Error::not_found("announcement button", player_id))?;
        let button = self
            .button(button_id)
            .ok_or_else(|| Error::not_found("announcement button", button_id))?;

        AnnouncementPlan::from_button(player, button)
    }

    fn derive_announcement_button(&self, player: &Player, existing: Option<&SoundButton>) -> SoundButton {
        let base = match existing {
            Some(button) => button.clone(),
            None => SoundButton {
                id: Uuid::new_v4(),
                color: self.defaults.color.clone(),
                fade_out_enabled: self.defaults.fade_out_enabled,
                fade_out_duration: self.defaults.fade_out_duration,
                ..SoundButton::default()
            },
        };

        SoundButton {
            name: player.name.clone(),
            song: player.walk_up_song.clone(),
            event_id: Some(player.team_event_id),
            order: player.order,
            is_announcement: true,
            player_id: Some(player.id),
            announcement: Some(Announcement {
                text: player_script(player),
                voice: self.effective_voice(player),
            }),
            ..base
        }
    }
}

fn validate_player_fields(player: &Player) -> Result<()> {
    if let Some(song) = &player.walk_up_song {
        require_seconds(song.start_offset_seconds, "start_offset_seconds")?;
        if song.track_id.trim().is_empty() {
            return Err(Error::InvalidInput("walk-up song track id must not be empty".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MusicSource, SongRef, TeamEvent, Voice, VoiceKind};

    fn store_with_team() -> (DataStore, Uuid) {
        let mut store = DataStore::new();
        let team = store.create_event(TeamEvent::new("Tigers")).unwrap();
        (store, team.id)
    }

    #[test]
    fn test_create_player_builds_announcement() {
        let (mut store, team) = store_with_team();
        let (player, button) = store
            .create_player(Player::new("Ruth", "3", team), None)
            .unwrap();

        assert_eq!(player.announcement_sound_id, Some(button.id));
        assert!(button.is_announcement);
        assert_eq!(button.player_id, Some(player.id));
        let announcement = button.announcement.unwrap();
        assert_eq!(announcement.text, "Now batting, number 3, Ruth");
        assert!(announcement.voice.is_neutral());
    }

    #[test]
    fn test_update_player_alone_keeps_stale_text() {
        let (mut store, team) = store_with_team();
        let (player, button) = store
            .create_player(Player::new("Ruth", "3", team), None)
            .unwrap();

        store
            .update_player(player.clone().with_position("RF"))
            .unwrap();
        let stale = store.button(button.id).unwrap();
        assert_eq!(
            stale.announcement.as_ref().unwrap().text,
            "Now batting, number 3, Ruth"
        );

        let synced = store.update_player_sound(player.id).unwrap();
        assert_eq!(synced.id, button.id);
        assert_eq!(
            synced.announcement.unwrap().text,
            "Now batting, number 3, RF, Ruth"
        );
    }

    #[test]
    fn test_voice_priority() {
        let (mut store, team) = store_with_team();
        let team_voice = store
            .add_voice(Voice::new("Stadium", VoiceKind::AiGenerated, "v-stadium"))
            .unwrap();
        let override_voice = store
            .add_voice(Voice::new("Booth", VoiceKind::System, "en-GB"))
            .unwrap();
        store.assign_voice_to_team(Some(team_voice.id), team).unwrap();

        let (_, team_button) = store
            .create_player(Player::new("Ruth", "3", team), None)
            .unwrap();
        let (_, override_button) = store
            .create_player(Player::new("Gehrig", "4", team), Some(override_voice.id))
            .unwrap();

        assert_eq!(team_button.announcement.unwrap().voice.id, team_voice.id);
        assert_eq!(override_button.announcement.unwrap().voice.id, override_voice.id);
    }

    #[test]
    fn test_resync_recreates_deleted_button() {
        let (mut store, team) = store_with_team();
        let (player, button) = store
            .create_player(Player::new("Ruth", "3", team), None)
            .unwrap();

        store.delete_button(button.id).unwrap();
        assert!(store.player(player.id).unwrap().announcement_sound_id.is_none());
        assert!(matches!(store.announcement_plan(player.id), Err(Error::NotFound { .. })));

        let recreated = store.update_player_sound(player.id).unwrap();
        assert_eq!(
            store.player(player.id).unwrap().announcement_sound_id,
            Some(recreated.id)
        );
    }

    #[test]
    fn test_plan_carries_walk_up_and_fade() {
        let (mut store, team) = store_with_team();
        let mut player = Player::new("Ruth", "3", team);
        player.walk_up_song = Some(SongRef::new(MusicSource::Remote, "trk-1").with_offset(12.0));
        let (player, button) = store.create_player(player, None).unwrap();

        store
            .update_button(SoundButton {
                fade_out_enabled: true,
                fade_out_duration: 4.0,
                ..button
            })
            .unwrap();

        let plan = store.announcement_plan(player.id).unwrap();
        assert_eq!(plan.walk_up.unwrap().start_offset_seconds, 12.0);
        assert!(plan.fade_out_enabled);
        assert_eq!(plan.fade_out_duration, 4.0);
    }

    #[test]
    fn test_delete_player_removes_owned_button_and_compacts() {
        let (mut store, team) = store_with_team();
        let (first, first_button) = store
            .create_player(Player::new("Ruth", "3", team), None)
            .unwrap();
        let (second, second_button) = store
            .create_player(Player::new("Gehrig", "4", team), None)
            .unwrap();

        store.delete_player(first.id).unwrap();
        assert!(store.button(first_button.id).is_none());
        assert_eq!(store.player(second.id).unwrap().order, 0);
        assert_eq!(store.button(second_button.id).unwrap().order, 0);
    }

    #[test]
    fn test_announcement_button_edits_are_cosmetic_only() {
        let (mut store, team) = store_with_team();
        let (_, button) = store
            .create_player(Player::new("Ruth", "3", team), None)
            .unwrap();

        let updated = store
            .update_button(SoundButton {
                name: "Renamed".into(),
                color: "#000000".into(),
                ..button.clone()
            })
            .unwrap();
        assert_eq!(updated.name, "Ruth");
        assert_eq!(updated.color, "#000000");
    }
}
