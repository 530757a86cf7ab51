//! # Dugout Common Library
//!
//! Shared code for the dugout soundboard crates including:
//! - Error type shared by the bootstrap and database layers
//! - Event types (DugoutEvent enum) and transport state definitions
//! - Bootstrap configuration loading and root folder resolution
//! - Fade curve definitions and calculations
//! - Human-readable clock formatting for transport displays
//! - SQLite initialization

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod events;
pub mod fade_curves;
pub mod human_time;

pub use error::{Error, Result};
pub use events::{DugoutEvent, EventBus, TransportKind, TransportState};
pub use fade_curves::FadeCurve;
