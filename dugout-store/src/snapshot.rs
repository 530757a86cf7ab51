//! Whole-graph snapshot
//!
//! The entity graph is serialized as one JSON document. Loading is
//! best-effort: missing fields default, legacy name-based category tags
//! are resolved to ids, dangling references are cleared and every order
//! scope is compacted.

use crate::model::{Category, DefaultSongSettings, Player, SoundButton, TeamEvent, Voice};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

/// Button as stored, with room for tags written by older builds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ButtonRecord {
    #[serde(flatten)]
    pub button: SoundButton,
    /// Category names from builds that tagged by name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category_tags: Vec<String>,
}

impl From<SoundButton> for ButtonRecord {
    fn from(button: SoundButton) -> Self {
        Self {
            button,
            category_tags: Vec::new(),
        }
    }
}

/// Serialized entity graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Snapshot {
    pub revision: u64,
    pub selected_event_id: Option<Uuid>,
    pub events: Vec<TeamEvent>,
    pub categories: Vec<Category>,
    pub buttons: Vec<ButtonRecord>,
    pub players: Vec<Player>,
    pub voices: Vec<Voice>,
    pub default_song_settings: DefaultSongSettings,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
            && self.categories.is_empty()
            && self.buttons.is_empty()
            && self.players.is_empty()
            && self.voices.is_empty()
    }
}

/// Entity graph after load-time repair
pub(crate) struct RepairedGraph {
    pub events: Vec<TeamEvent>,
    pub categories: Vec<Category>,
    pub buttons: Vec<SoundButton>,
    pub players: Vec<Player>,
    pub voices: Vec<Voice>,
    pub defaults: DefaultSongSettings,
}

/// Resolve legacy tags and drop references to entities that no longer exist
///
/// Order compaction and announcement-order syncing are left to the store.
pub(crate) fn repair(snapshot: Snapshot) -> RepairedGraph {
    let Snapshot {
        events,
        categories,
        buttons,
        players,
        voices,
        mut default_song_settings,
        ..
    } = snapshot;

    let event_ids: HashSet<Uuid> = events.iter().map(|e| e.id).collect();
    let voice_ids: HashSet<Uuid> = voices.iter().map(|v| v.id).collect();

    let mut events = events;
    for event in &mut events {
        if event.voice_id.is_some_and(|id| !voice_ids.contains(&id)) {
            warn!(event = %event.id, "Clearing dangling team voice reference");
            event.voice_id = None;
        }
    }

    let categories: Vec<Category> = categories
        .into_iter()
        .filter(|c| match c.event_id {
            Some(event_id) if !event_ids.contains(&event_id) => {
                warn!(category = %c.id, "Dropping category of unknown event");
                false
            }
            _ => true,
        })
        .collect();
    let category_ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();

    let players: Vec<Player> = players
        .into_iter()
        .filter(|p| {
            let keep = event_ids.contains(&p.team_event_id);
            if !keep {
                warn!(player = %p.id, "Dropping player of unknown team");
            }
            keep
        })
        .map(|mut p| {
            if p.voice_override.is_some_and(|id| !voice_ids.contains(&id)) {
                p.voice_override = None;
            }
            p
        })
        .collect();
    let player_ids: HashSet<Uuid> = players.iter().map(|p| p.id).collect();

    let mut kept = Vec::with_capacity(buttons.len());
    for record in dedup_buttons(buttons.into_iter()) {
        let ButtonRecord {
            mut button,
            category_tags,
        } = record;

        if button.event_id.is_some_and(|id| !event_ids.contains(&id)) {
            warn!(button = %button.id, "Dropping button of unknown event");
            continue;
        }
        if button.is_announcement && !button.player_id.is_some_and(|id| player_ids.contains(&id)) {
            warn!(button = %button.id, "Dropping orphaned announcement button");
            continue;
        }

        for name in &category_tags {
            match resolve_tag(&categories, button.event_id, name) {
                Some(id) => {
                    button.category_ids.insert(id);
                }
                None => warn!(button = %button.id, tag = %name, "Dropping unresolvable category tag"),
            }
        }
        button.category_ids.retain(|id| category_ids.contains(id));
        kept.push(button);
    }
    let buttons = kept;

    default_song_settings
        .category_ids
        .retain(|id| category_ids.contains(id));

    // Owned-button back references must point at a surviving announcement
    // button whose owner is this player.
    let mut players = players;
    for player in &mut players {
        if let Some(button_id) = player.announcement_sound_id {
            let owned = buttons
                .iter()
                .any(|b| b.id == button_id && b.is_announcement && b.player_id == Some(player.id));
            if !owned {
                player.announcement_sound_id = None;
            }
        }
    }

    RepairedGraph {
        events,
        categories,
        buttons,
        players,
        voices,
        defaults: default_song_settings,
    }
}

/// Keep the first record for each id
fn dedup_buttons(records: impl Iterator<Item = ButtonRecord>) -> impl Iterator<Item = ButtonRecord> {
    let mut seen = HashSet::new();
    records.filter(move |r| seen.insert(r.button.id))
}

/// Resolve a category name within the button's visible scope
/// (its event's categories plus globals), event-scoped first
fn resolve_tag(categories: &[Category], event_id: Option<Uuid>, name: &str) -> Option<Uuid> {
    let name = name.trim();
    let matches = |c: &&Category| c.name.trim().eq_ignore_ascii_case(name);

    event_id
        .and_then(|event_id| {
            categories
                .iter()
                .filter(|c| c.event_id == Some(event_id))
                .find(matches)
        })
        .or_else(|| categories.iter().filter(|c| c.is_global()).find(matches))
        .map(|c| c.id)
}
