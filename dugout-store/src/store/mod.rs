//! Data store core
//!
//! Owns the entity vectors, the selected event, the revision counter and
//! the persistence hook. Entity operations live in the submodules as
//! further `impl DataStore` blocks.
//!
//! **Responsibilities:**
//! - Lookups and derived read views (recomputed on every call, never cached)
//! - The single `reorder` primitive over every order scope
//! - `commit()` after every successful mutation: bump revision, hand a
//!   snapshot to the writer, announce `StoreChanged`
//!
//! Every mutating operation validates its preconditions first and only
//! then touches the graph, so an `Err` leaves the store unchanged.

mod buttons;
mod categories;
mod events;
mod players;
mod voices;

use crate::error::{Error, Result};
use crate::model::{Category, DefaultSongSettings, Player, SoundButton, TeamEvent, Voice};
use crate::ordering::{self, OrderScope};
use crate::snapshot::{self, ButtonRecord, Snapshot};
use dugout_common::events::{DugoutEvent, EventBus};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Counts of entities removed by a team event delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub categories: usize,
    pub buttons: usize,
    pub players: usize,
    /// Owned announcement buttons removed with their players
    pub announcement_buttons: usize,
}

/// Everything shown for the selected event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub event: Option<TeamEvent>,
    pub categories: Vec<Category>,
    pub buttons: Vec<SoundButton>,
    pub players: Vec<Player>,
}

/// In-memory entity graph
#[derive(Default)]
pub struct DataStore {
    events: Vec<TeamEvent>,
    categories: Vec<Category>,
    buttons: Vec<SoundButton>,
    players: Vec<Player>,
    voices: Vec<Voice>,
    defaults: DefaultSongSettings,
    selected_event: Option<Uuid>,
    revision: u64,
    sink: Option<mpsc::UnboundedSender<Snapshot>>,
    bus: Option<EventBus>,
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("events", &self.events.len())
            .field("categories", &self.categories.len())
            .field("buttons", &self.buttons.len())
            .field("players", &self.players.len())
            .field("voices", &self.voices.len())
            .field("selected_event", &self.selected_event)
            .field("revision", &self.revision)
            .finish()
    }
}

impl DataStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a persisted snapshot
    ///
    /// Repairs the graph (legacy tags, dangling references), compacts every
    /// order scope and falls back to the first event when the saved
    /// selection is missing.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let revision = snapshot.revision;
        let selected = snapshot.selected_event_id;
        let graph = snapshot::repair(snapshot);

        let mut store = Self {
            events: graph.events,
            categories: graph.categories,
            buttons: graph.buttons,
            players: graph.players,
            voices: graph.voices,
            defaults: graph.defaults,
            selected_event: selected,
            revision,
            sink: None,
            bus: None,
        };

        store.compact_all();
        if !store.selected_event.is_some_and(|id| store.has_event(id)) {
            store.selected_event = store.first_event_id();
        }

        debug!(
            revision,
            events = store.events.len(),
            buttons = store.buttons.len(),
            players = store.players.len(),
            "Store loaded from snapshot"
        );
        store
    }

    /// Whole-graph snapshot of the current state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            selected_event_id: self.selected_event,
            events: self.events.clone(),
            categories: self.categories.clone(),
            buttons: self.buttons.iter().cloned().map(ButtonRecord::from).collect(),
            players: self.players.clone(),
            voices: self.voices.clone(),
            default_song_settings: self.defaults.clone(),
        }
    }

    /// Send a snapshot to `sink` after every mutation
    pub fn attach_sink(&mut self, sink: mpsc::UnboundedSender<Snapshot>) {
        self.sink = Some(sink);
    }

    /// Stop persisting; the writer drains its queue and exits once this
    /// was the last sender
    pub fn detach_sink(&mut self) {
        self.sink = None;
    }

    /// Announce `StoreChanged` on `bus` after every mutation
    pub fn attach_event_bus(&mut self, bus: EventBus) {
        self.bus = Some(bus);
    }

    /// Monotonic mutation counter
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn commit(&mut self) {
        self.revision += 1;

        if let Some(sink) = &self.sink {
            if sink.send(self.snapshot()).is_err() {
                warn!(revision = self.revision, "Snapshot writer is gone, change not persisted");
            }
        }

        if let Some(bus) = &self.bus {
            bus.emit_lossy(DugoutEvent::StoreChanged {
                revision: self.revision,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Make `id` the selected event
    pub fn select_event(&mut self, id: Uuid) -> Result<()> {
        self.event_index(id)?;
        if self.selected_event != Some(id) {
            self.selected_event = Some(id);
            debug!(event = %id, "Selected team event");
            self.commit();
        }
        Ok(())
    }

    pub fn selected_event_id(&self) -> Option<Uuid> {
        self.selected_event
    }

    pub fn selected_event(&self) -> Option<&TeamEvent> {
        self.selected_event.and_then(|id| self.event(id))
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn event(&self, id: Uuid) -> Option<&TeamEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn button(&self, id: Uuid) -> Option<&SoundButton> {
        self.buttons.iter().find(|b| b.id == id)
    }

    pub fn player(&self, id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn voice(&self, id: Uuid) -> Option<&Voice> {
        self.voices.iter().find(|v| v.id == id)
    }

    pub fn default_song_settings(&self) -> &DefaultSongSettings {
        &self.defaults
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// All team events in display order
    pub fn events(&self) -> Vec<&TeamEvent> {
        sorted(&self.events, |_| true)
    }

    /// Categories visible under `event`: globals first, then the event's own
    pub fn categories_for(&self, event: Option<Uuid>) -> Vec<&Category> {
        let mut visible = sorted(&self.categories, |c| c.event_id.is_none());
        if event.is_some() {
            visible.extend(sorted(&self.categories, |c| c.event_id == event));
        }
        visible
    }

    /// Regular buttons visible under `event`: the event's own, then globals
    ///
    /// Announcement buttons are listed through [`DataStore::announcement_buttons_for`].
    pub fn buttons_for(&self, event: Option<Uuid>) -> Vec<&SoundButton> {
        let mut visible = Vec::new();
        if event.is_some() {
            visible.extend(sorted(&self.buttons, |b| {
                !b.is_announcement && b.event_id == event
            }));
        }
        visible.extend(sorted(&self.buttons, |b| {
            !b.is_announcement && b.event_id.is_none()
        }));
        visible
    }

    /// Visible buttons tagged with `category`
    pub fn buttons_in_category(&self, category: Uuid, event: Option<Uuid>) -> Vec<&SoundButton> {
        self.buttons_for(event)
            .into_iter()
            .filter(|b| b.category_ids.contains(&category))
            .collect()
    }

    /// Lineup for a team
    pub fn players_for(&self, team: Uuid) -> Vec<&Player> {
        sorted(&self.players, |p| p.team_event_id == team)
    }

    /// Announcement buttons for a team in lineup order
    pub fn announcement_buttons_for(&self, team: Uuid) -> Vec<&SoundButton> {
        sorted(&self.buttons, |b| {
            b.is_announcement && b.event_id == Some(team)
        })
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Board contents for the selected event
    pub fn board(&self) -> BoardView {
        let event = self.selected_event().cloned();
        let event_id = event.as_ref().map(|e| e.id);

        BoardView {
            categories: self.categories_for(event_id).into_iter().cloned().collect(),
            buttons: self.buttons_for(event_id).into_iter().cloned().collect(),
            players: event_id
                .map(|id| self.players_for(id).into_iter().cloned().collect())
                .unwrap_or_default(),
            event,
        }
    }

    /// Board for the selected event with buttons narrowed to one category
    pub fn board_in_category(&self, category: Uuid) -> Result<BoardView> {
        self.category(category)
            .ok_or_else(|| Error::not_found("category", category))?;
        let mut board = self.board();
        let event_id = board.event.as_ref().map(|e| e.id);
        board.buttons = self
            .buttons_in_category(category, event_id)
            .into_iter()
            .cloned()
            .collect();
        Ok(board)
    }

    // ------------------------------------------------------------------
    // Reordering
    // ------------------------------------------------------------------

    /// Move the item at `from` to `to` within `scope` and renumber the scope
    pub fn reorder(&mut self, scope: OrderScope, from: usize, to: usize) -> Result<()> {
        match scope {
            OrderScope::TeamEvents => ordering::move_within(&mut self.events, |_| true, from, to)?,
            OrderScope::Categories(event) => {
                self.require_scope_event(event)?;
                ordering::move_within(&mut self.categories, |c| c.event_id == event, from, to)?
            }
            OrderScope::Buttons(event) => {
                self.require_scope_event(event)?;
                ordering::move_within(
                    &mut self.buttons,
                    |b| !b.is_announcement && b.event_id == event,
                    from,
                    to,
                )?
            }
            OrderScope::Players(team) => {
                self.event_index(team)?;
                ordering::move_within(&mut self.players, |p| p.team_event_id == team, from, to)?;
                self.sync_announcement_orders(team);
            }
        }

        debug!(?scope, from, to, "Reordered scope");
        self.commit();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    pub(crate) fn has_event(&self, id: Uuid) -> bool {
        self.events.iter().any(|e| e.id == id)
    }

    pub(crate) fn event_index(&self, id: Uuid) -> Result<usize> {
        self.events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Error::not_found("team event", id))
    }

    pub(crate) fn category_index(&self, id: Uuid) -> Result<usize> {
        self.categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::not_found("category", id))
    }

    pub(crate) fn button_index(&self, id: Uuid) -> Result<usize> {
        self.buttons
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| Error::not_found("button", id))
    }

    pub(crate) fn player_index(&self, id: Uuid) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::not_found("player", id))
    }

    pub(crate) fn voice_index(&self, id: Uuid) -> Result<usize> {
        self.voices
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| Error::not_found("voice", id))
    }

    /// `None` is the global scope and always exists
    pub(crate) fn require_scope_event(&self, event: Option<Uuid>) -> Result<()> {
        match event {
            Some(id) => self.event_index(id).map(|_| ()),
            None => Ok(()),
        }
    }

    pub(crate) fn first_event_id(&self) -> Option<Uuid> {
        self.events.iter().min_by_key(|e| e.order).map(|e| e.id)
    }

    /// Announcement buttons follow their owner's team and lineup position
    pub(crate) fn sync_announcement_orders(&mut self, team: Uuid) {
        let owners: Vec<(Uuid, Uuid, usize)> = self
            .players
            .iter()
            .filter(|p| p.team_event_id == team)
            .filter_map(|p| p.announcement_sound_id.map(|b| (b, p.team_event_id, p.order)))
            .collect();

        for (button_id, team, order) in owners {
            if let Some(button) = self.buttons.iter_mut().find(|b| b.id == button_id) {
                button.event_id = Some(team);
                button.order = order;
            }
        }
    }

    fn compact_all(&mut self) {
        ordering::compact(&mut self.events, |_| true);

        let mut scopes: Vec<Option<Uuid>> = vec![None];
        scopes.extend(self.events.iter().map(|e| Some(e.id)));

        for scope in scopes {
            ordering::compact(&mut self.categories, |c| c.event_id == scope);
            ordering::compact(&mut self.buttons, |b| {
                !b.is_announcement && b.event_id == scope
            });
            if let Some(team) = scope {
                ordering::compact(&mut self.players, |p| p.team_event_id == team);
                self.sync_announcement_orders(team);
            }
        }
    }
}

/// In-scope items sorted by order
fn sorted<T: ordering::Ordered>(items: &[T], in_scope: impl Fn(&T) -> bool) -> Vec<&T> {
    ordering::scope_indices(items, in_scope)
        .into_iter()
        .map(|i| &items[i])
        .collect()
}

/// Trimmed, non-empty display name
pub(crate) fn require_name(name: &str, kind: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{kind} name must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Finite, non-negative seconds
pub(crate) fn require_seconds(value: f64, field: &str) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidInput(format!(
            "{field} must be a non-negative number of seconds, got {value}"
        )));
    }
    Ok(value)
}
