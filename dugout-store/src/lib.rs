//! # Dugout Relational Data Store (dugout-store)
//!
//! In-memory entity graph for the soundboard: team events, categories,
//! sound buttons, players and voices.
//!
//! **Responsibilities:**
//! - CRUD with referential integrity (cascading event deletes, tag cleanup)
//! - Dense `0..n-1` ordering within every scope via a single reorder primitive
//! - Derived announcement buttons owned by players
//! - Filtered views for the selected event
//! - Whole-graph snapshots persisted to SQLite on every mutation
//!
//! The store has no internal locking. Callers serialize access (the player
//! crate wraps it in a mutex next to the playback engine).

pub mod announcement;
pub mod db;
pub mod error;
pub mod model;
pub mod ordering;
pub mod roster;
pub mod snapshot;
pub mod store;

pub use announcement::{announcement_text, AnnouncementPlan};
pub use error::{Error, Result};
pub use model::{
    Announcement, Category, DefaultSongSettings, MusicSource, Player, SongRef, SoundButton,
    TeamEvent, Voice, VoiceKind,
};
pub use ordering::OrderScope;
pub use roster::RosterCandidate;
pub use snapshot::Snapshot;
pub use store::{BoardView, CascadeReport, DataStore};
