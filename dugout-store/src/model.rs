//! Entity model
//!
//! Every entity is identified by a v4 UUID. `order` fields are dense
//! zero-based positions within the entity's scope and are owned by the
//! store: values passed in through create/update calls are ignored.
//!
//! Structs carry `#[serde(default)]` so snapshots written by older builds
//! load with missing fields filled from `Default`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Default button/event color
pub const DEFAULT_COLOR: &str = "#1E88E5";

/// Default fade-out length in seconds
pub const DEFAULT_FADE_OUT_SECONDS: f64 = 3.0;

/// Where a song lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MusicSource {
    /// Host media library
    #[default]
    #[serde(alias = "local_library")]
    Local,
    /// Remote streaming catalog
    #[serde(alias = "remote_catalog")]
    Remote,
}

impl std::fmt::Display for MusicSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MusicSource::Local => write!(f, "local"),
            MusicSource::Remote => write!(f, "remote"),
        }
    }
}

/// Song descriptor: `(source, track reference, start offset)` plus cached
/// display metadata captured when the song was picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SongRef {
    pub source: MusicSource,
    /// Opaque identifier understood by the resolver for `source`
    pub track_id: String,
    pub start_offset_seconds: f64,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl SongRef {
    pub fn new(source: MusicSource, track_id: impl Into<String>) -> Self {
        Self {
            source,
            track_id: track_id.into(),
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, seconds: f64) -> Self {
        self.start_offset_seconds = seconds;
        self
    }
}

/// Team or occasion; root scope for categories, buttons and players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamEvent {
    pub id: Uuid,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub color: String,
    pub icon: String,
    pub order: usize,
    /// Weak reference to the voice used for this team's announcements
    pub voice_id: Option<Uuid>,
}

impl TeamEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for TeamEvent {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            date: None,
            color: DEFAULT_COLOR.to_string(),
            icon: "sportscourt".to_string(),
            order: 0,
            voice_id: None,
        }
    }
}

/// Button grouping; `event_id == None` marks a global category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub order: usize,
    pub event_id: Option<Uuid>,
}

impl Category {
    pub fn new(name: impl Into<String>, event_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            event_id,
            ..Self::default()
        }
    }

    pub fn is_global(&self) -> bool {
        self.event_id.is_none()
    }
}

impl Default for Category {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            color: "#8E24AA".to_string(),
            icon: "music.note".to_string(),
            order: 0,
            event_id: None,
        }
    }
}

/// Kind of speech synthesis behind a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoiceKind {
    /// Live on-device speech synthesis
    #[default]
    System,
    /// Pre-rendered clip from a remote AI voice provider
    #[serde(alias = "aiGenerated")]
    AiGenerated,
}

/// Announcer voice profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Voice {
    pub id: Uuid,
    pub name: String,
    pub kind: VoiceKind,
    /// Provider-specific voice identifier (system voice name or AI voice id)
    pub provider_voice_id: String,
    /// Speaking rate, 0.0 (slowest) to 1.0 (fastest); 0.5 is normal
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub pre_delay_seconds: f64,
    pub post_delay_seconds: f64,
}

impl Voice {
    pub fn new(name: impl Into<String>, kind: VoiceKind, provider_voice_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            provider_voice_id: provider_voice_id.into(),
            ..Self::neutral()
        }
    }

    /// Hard-coded fallback voice used when neither an override nor a team
    /// voice applies
    pub fn neutral() -> Self {
        Self {
            id: Uuid::nil(),
            name: "Default".to_string(),
            kind: VoiceKind::System,
            provider_voice_id: "en-US".to_string(),
            rate: 0.5,
            pitch: 1.0,
            volume: 1.0,
            pre_delay_seconds: 0.0,
            post_delay_seconds: 0.0,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.id.is_nil()
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Spoken part of an announcement button: script plus the voice it was
/// last synced with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Announcement {
    pub text: String,
    pub voice: Voice,
}

/// Named, colored trigger mapped to a song clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundButton {
    pub id: Uuid,
    pub name: String,
    pub song: Option<SongRef>,
    pub category_ids: BTreeSet<Uuid>,
    pub color: String,
    pub event_id: Option<Uuid>,
    pub order: usize,
    pub fade_out_enabled: bool,
    pub fade_out_duration: f64,
    pub is_announcement: bool,
    /// Owning player for announcement buttons
    pub player_id: Option<Uuid>,
    pub announcement: Option<Announcement>,
}

impl SoundButton {
    pub fn new(name: impl Into<String>, song: Option<SongRef>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            song,
            ..Self::default()
        }
    }
}

impl Default for SoundButton {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            song: None,
            category_ids: BTreeSet::new(),
            color: DEFAULT_COLOR.to_string(),
            event_id: None,
            order: 0,
            fade_out_enabled: false,
            fade_out_duration: DEFAULT_FADE_OUT_SECONDS,
            is_announcement: false,
            player_id: None,
            announcement: None,
        }
    }
}

/// Lineup entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    /// Jersey number as printed ("00" and "0" are different numbers)
    pub number: String,
    pub position: Option<String>,
    /// Batting/lineup order within the team
    pub order: usize,
    pub team_event_id: Uuid,
    pub walk_up_song: Option<SongRef>,
    /// Owned announcement button
    pub announcement_sound_id: Option<Uuid>,
    /// Explicit voice chosen for this player, beats the team voice
    pub voice_override: Option<Uuid>,
}

impl Player {
    pub fn new(name: impl Into<String>, number: impl Into<String>, team_event_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            number: number.into(),
            team_event_id,
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }
}

impl Default for Player {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            number: String::new(),
            position: None,
            order: 0,
            team_event_id: Uuid::nil(),
            walk_up_song: None,
            announcement_sound_id: None,
            voice_override: None,
        }
    }
}

/// Template applied to newly created buttons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSongSettings {
    pub color: String,
    pub fade_out_enabled: bool,
    pub fade_out_duration: f64,
    pub category_ids: BTreeSet<Uuid>,
    pub start_from_beginning: bool,
}

impl Default for DefaultSongSettings {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            fade_out_enabled: true,
            fade_out_duration: DEFAULT_FADE_OUT_SECONDS,
            category_ids: BTreeSet::new(),
            start_from_beginning: false,
        }
    }
}
