//! Announcement derivation
//!
//! The owned announcement button of a player is a pure function of the
//! saved player record and the effective voice. This module holds the text
//! template and the read-side plan handed to the playback engine.

use crate::error::{Error, Result};
use crate::model::{Player, SongRef, SoundButton, Voice};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Build the spoken script for a player
///
/// `"Now batting, number {N}[, {position}], {name}"`. Blank positions are
/// skipped; a blank number drops the `number` clause.
///
/// # Examples
///
/// ```
/// use dugout_store::announcement_text;
///
/// assert_eq!(announcement_text("3", None, "Ruth"), "Now batting, number 3, Ruth");
/// assert_eq!(
///     announcement_text("3", Some("RF"), "Ruth"),
///     "Now batting, number 3, RF, Ruth"
/// );
/// ```
pub fn announcement_text(number: &str, position: Option<&str>, name: &str) -> String {
    let mut text = String::from("Now batting");

    let number = number.trim();
    if !number.is_empty() {
        text.push_str(", number ");
        text.push_str(number);
    }

    if let Some(position) = position.map(str::trim).filter(|p| !p.is_empty()) {
        text.push_str(", ");
        text.push_str(position);
    }

    text.push_str(", ");
    text.push_str(name.trim());
    text
}

/// Script for a player record
pub(crate) fn player_script(player: &Player) -> String {
    announcement_text(&player.number, player.position.as_deref(), &player.name)
}

/// Everything the engine needs to run a player's announcement sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementPlan {
    pub player_id: Uuid,
    pub button_id: Uuid,
    /// Display title ("#3 Ruth")
    pub title: String,
    pub text: String,
    pub voice: Voice,
    pub walk_up: Option<SongRef>,
    pub fade_out_enabled: bool,
    pub fade_out_duration: f64,
}

impl AnnouncementPlan {
    /// Build a plan from an owned announcement button
    ///
    /// Fails with `InvalidInput` if the button carries no announcement
    /// payload.
    pub fn from_button(player: &Player, button: &SoundButton) -> Result<Self> {
        let announcement = button.announcement.as_ref().ok_or_else(|| {
            Error::InvalidInput(format!("button {} has no announcement", button.id))
        })?;

        let title = if player.number.trim().is_empty() {
            player.name.clone()
        } else {
            format!("#{} {}", player.number.trim(), player.name)
        };

        Ok(Self {
            player_id: player.id,
            button_id: button.id,
            title,
            text: announcement.text.clone(),
            voice: announcement.voice.clone(),
            walk_up: button.song.clone(),
            fade_out_enabled: button.fade_out_enabled,
            fade_out_duration: button.fade_out_duration,
        })
    }
}
