//! Team event operations

use super::{require_name, CascadeReport, DataStore};
use crate::error::{Error, Result};
use crate::model::TeamEvent;
use crate::ordering;
use tracing::{info, warn};
use uuid::Uuid;

impl DataStore {
    /// Append a new team event; the first event created becomes selected
    pub fn create_event(&mut self, mut event: TeamEvent) -> Result<TeamEvent> {
        event.name = require_name(&event.name, "team event")?;
        if event.id.is_nil() {
            event.id = Uuid::new_v4();
        } else if self.has_event(event.id) {
            return Err(Error::InvalidInput(format!("team event {} already exists", event.id)));
        }
        if let Some(voice_id) = event.voice_id {
            self.voice_index(voice_id)?;
        }

        event.order = ordering::next_order(&self.events, |_| true);
        self.events.push(event.clone());
        if self.selected_event.is_none() {
            self.selected_event = Some(event.id);
        }

        info!(event = %event.id, name = %event.name, "Created team event");
        self.commit();
        Ok(event)
    }

    /// Update name, date, color, icon and voice of an existing event
    ///
    /// `order` is ignored; use `reorder` to move events. A voice change
    /// refreshes the voice carried by the team's announcement buttons.
    pub fn update_event(&mut self, event: TeamEvent) -> Result<TeamEvent> {
        let index = self.event_index(event.id)?;
        let name = require_name(&event.name, "team event")?;
        if let Some(voice_id) = event.voice_id {
            self.voice_index(voice_id)?;
        }

        let voice_changed = self.events[index].voice_id != event.voice_id;
        let stored = &mut self.events[index];
        stored.name = name;
        stored.date = event.date;
        stored.color = event.color;
        stored.icon = event.icon;
        stored.voice_id = event.voice_id;
        let updated = stored.clone();

        if voice_changed {
            self.refresh_announcement_voices();
        }

        self.commit();
        Ok(updated)
    }

    /// Delete a team event and everything scoped to it
    ///
    /// Refuses with `CannotDeleteLastScope` when it is the only event. If
    /// the deleted event was selected, the first remaining event is
    /// selected instead.
    pub fn delete_event(&mut self, id: Uuid) -> Result<CascadeReport> {
        self.event_index(id)?;
        if self.events.len() == 1 {
            warn!(event = %id, "Refusing to delete the last team event");
            return Err(Error::CannotDeleteLastScope);
        }

        let scope = Some(id);
        let report = CascadeReport {
            categories: self.categories.iter().filter(|c| c.event_id == scope).count(),
            buttons: self
                .buttons
                .iter()
                .filter(|b| b.event_id == scope && !b.is_announcement)
                .count(),
            players: self.players.iter().filter(|p| p.team_event_id == id).count(),
            announcement_buttons: self
                .buttons
                .iter()
                .filter(|b| b.event_id == scope && b.is_announcement)
                .count(),
        };

        let removed_categories: Vec<Uuid> = self
            .categories
            .iter()
            .filter(|c| c.event_id == scope)
            .map(|c| c.id)
            .collect();
        let removed_players: Vec<Uuid> = self
            .players
            .iter()
            .filter(|p| p.team_event_id == id)
            .map(|p| p.id)
            .collect();

        self.events.retain(|e| e.id != id);
        self.categories.retain(|c| c.event_id != scope);
        self.players.retain(|p| p.team_event_id != id);
        self.buttons.retain(|b| {
            b.event_id != scope && !b.player_id.is_some_and(|p| removed_players.contains(&p))
        });

        // Global buttons may carry tags of the removed scoped categories.
        for button in &mut self.buttons {
            button.category_ids.retain(|c| !removed_categories.contains(c));
        }
        self.defaults
            .category_ids
            .retain(|c| !removed_categories.contains(c));

        ordering::compact(&mut self.events, |_| true);

        if self.selected_event == Some(id) {
            self.selected_event = self.first_event_id();
        }

        info!(
            event = %id,
            categories = report.categories,
            buttons = report.buttons,
            players = report.players,
            "Deleted team event"
        );
        self.commit();
        Ok(report)
    }
}
