//! Sound button operations
//!
//! Regular buttons are plain CRUD. Announcement buttons are owned by
//! players and created through the player operations; here they only
//! accept cosmetic edits (color, fade, tags).

use super::{require_name, require_seconds, DataStore};
use crate::error::{Error, Result};
use crate::model::{SongRef, SoundButton};
use crate::ordering;
use std::collections::BTreeSet;
use tracing::{debug, info};
use uuid::Uuid;

impl DataStore {
    /// Append a regular button at the end of its scope
    pub fn create_button(&mut self, mut button: SoundButton) -> Result<SoundButton> {
        if button.is_announcement || button.player_id.is_some() || button.announcement.is_some() {
            return Err(Error::InvalidInput(
                "announcement buttons are created through players".to_string(),
            ));
        }
        button.name = require_name(&button.name, "button")?;
        self.require_scope_event(button.event_id)?;
        self.validate_button_fields(&button.song, button.fade_out_duration, &button.category_ids)?;
        if button.id.is_nil() {
            button.id = Uuid::new_v4();
        } else if self.button(button.id).is_some() {
            return Err(Error::InvalidInput(format!("button {} already exists", button.id)));
        }

        let scope = button.event_id;
        button.order = ordering::next_order(&self.buttons, |b| {
            !b.is_announcement && b.event_id == scope
        });
        self.buttons.push(button.clone());

        info!(button = %button.id, name = %button.name, "Created button");
        self.commit();
        Ok(button)
    }

    /// Create a button from the default song template
    pub fn create_button_from_defaults(
        &mut self,
        name: &str,
        song: Option<SongRef>,
        event_id: Option<Uuid>,
    ) -> Result<SoundButton> {
        let defaults = self.defaults.clone();
        let song = song.map(|mut song| {
            if defaults.start_from_beginning {
                song.start_offset_seconds = 0.0;
            }
            song
        });

        self.create_button(SoundButton {
            color: defaults.color,
            event_id,
            fade_out_enabled: defaults.fade_out_enabled,
            fade_out_duration: defaults.fade_out_duration,
            category_ids: defaults.category_ids,
            ..SoundButton::new(name, song)
        })
    }

    /// Update a button
    ///
    /// Changing `event_id` moves the button to the end of the destination
    /// scope. For announcement buttons only color, fade settings and tags
    /// are taken from `button`; everything else is derived from the owner.
    pub fn update_button(&mut self, button: SoundButton) -> Result<SoundButton> {
        let index = self.button_index(button.id)?;

        if self.buttons[index].is_announcement {
            require_seconds(button.fade_out_duration, "fade_out_duration")?;
            self.require_categories(&button.category_ids)?;

            let stored = &mut self.buttons[index];
            stored.color = button.color;
            stored.fade_out_enabled = button.fade_out_enabled;
            stored.fade_out_duration = button.fade_out_duration;
            stored.category_ids = button.category_ids;
            let updated = stored.clone();

            debug!(button = %updated.id, "Updated announcement button appearance");
            self.commit();
            return Ok(updated);
        }

        if button.is_announcement || button.player_id.is_some() || button.announcement.is_some() {
            return Err(Error::InvalidInput(
                "regular buttons cannot become announcement buttons".to_string(),
            ));
        }
        let name = require_name(&button.name, "button")?;
        self.require_scope_event(button.event_id)?;
        self.validate_button_fields(&button.song, button.fade_out_duration, &button.category_ids)?;

        let old_scope = self.buttons[index].event_id;
        let new_scope = button.event_id;
        let moved = old_scope != new_scope;
        let order = if moved {
            ordering::next_order(&self.buttons, |b| {
                !b.is_announcement && b.event_id == new_scope
            })
        } else {
            self.buttons[index].order
        };

        let updated = SoundButton {
            name,
            order,
            ..button
        };
        self.buttons[index] = updated.clone();

        if moved {
            ordering::compact(&mut self.buttons, |b| {
                !b.is_announcement && b.event_id == old_scope
            });
        }

        self.commit();
        Ok(updated)
    }

    /// Delete a button
    ///
    /// Deleting an announcement button clears the owner's reference; it is
    /// recreated by the next `update_player_sound`.
    pub fn delete_button(&mut self, id: Uuid) -> Result<()> {
        let index = self.button_index(id)?;
        let removed = self.buttons.remove(index);

        if removed.is_announcement {
            if let Some(owner) = self
                .players
                .iter_mut()
                .find(|p| p.announcement_sound_id == Some(id))
            {
                owner.announcement_sound_id = None;
            }
        } else {
            let scope = removed.event_id;
            ordering::compact(&mut self.buttons, |b| {
                !b.is_announcement && b.event_id == scope
            });
        }

        info!(button = %id, name = %removed.name, "Deleted button");
        self.commit();
        Ok(())
    }

    fn validate_button_fields(
        &self,
        song: &Option<SongRef>,
        fade_out_duration: f64,
        category_ids: &BTreeSet<Uuid>,
    ) -> Result<()> {
        if let Some(song) = song {
            require_seconds(song.start_offset_seconds, "start_offset_seconds")?;
            if song.track_id.trim().is_empty() {
                return Err(Error::InvalidInput("song track id must not be empty".to_string()));
            }
        }
        require_seconds(fade_out_duration, "fade_out_duration")?;
        self.require_categories(category_ids)
    }

    pub(crate) fn require_categories(&self, category_ids: &BTreeSet<Uuid>) -> Result<()> {
        for id in category_ids {
            self.category_index(*id)?;
        }
        Ok(())
    }
}
