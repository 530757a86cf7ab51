//! Roster text importer
//!
//! Turns recognized text lines (a printed lineup card, a pasted roster)
//! into candidate player records. Each line needs a jersey number to be
//! accepted; name and position are picked from the remaining tokens.
//!
//! Accepted shapes include:
//! - `#12 Jane Doe SS`
//! - `12 Jane Doe (P)`
//! - `12. Doe, Jane - CF`
//! - `Jane Doe 12 RF`

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Positions recognized on a roster line
pub const POSITIONS: &[&str] = &[
    "P", "C", "1B", "2B", "3B", "SS", "LF", "CF", "RF", "DH", "EH", "OF", "IF", "UT",
];

static NUMBER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?(\d{1,3})[.:)]?$").expect("number pattern is valid"));

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[()\[\]|]|\s[-–—]\s|^[-–—]\s|\s[-–—]$").expect("separator pattern is valid"));

/// Player candidate extracted from one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterCandidate {
    pub name: String,
    pub number: String,
    pub position: Option<String>,
}

/// Parse a single line; `None` if it has no jersey number or no name
pub fn parse_line(line: &str) -> Option<RosterCandidate> {
    let cleaned = SEPARATORS.replace_all(line.trim(), " ");

    let mut number = None;
    let mut name_tokens = Vec::new();

    for token in cleaned.split_whitespace() {
        if number.is_none() {
            if let Some(caps) = NUMBER_TOKEN.captures(token) {
                number = Some(caps[1].to_string());
                continue;
            }
        }
        name_tokens.push(token);
    }

    // Only the trailing token can be a position; a middle initial stays
    // part of the name
    let mut position = None;
    if name_tokens.len() > 1 {
        if let Some(last) = name_tokens.last() {
            let upper = last
                .trim_matches(|c: char| c == ',' || c == '.' || c == ';')
                .to_ascii_uppercase();
            if POSITIONS.contains(&upper.as_str()) {
                position = Some(upper);
                name_tokens.pop();
            }
        }
    }

    let number = number?;
    let name = normalize_name(&name_tokens.join(" "))?;

    Some(RosterCandidate {
        name,
        number,
        position,
    })
}

/// Parse recognized lines into deduplicated, number-sorted candidates
///
/// The first line carrying a given jersey number wins.
pub fn parse_roster<S: AsRef<str>>(lines: &[S]) -> Vec<RosterCandidate> {
    let mut seen = HashSet::new();
    let mut candidates: Vec<RosterCandidate> = lines
        .iter()
        .filter_map(|line| {
            let parsed = parse_line(line.as_ref());
            if parsed.is_none() {
                debug!(line = line.as_ref(), "Skipping roster line");
            }
            parsed
        })
        .filter(|c| seen.insert(c.number.clone()))
        .collect();

    candidates.sort_by(|a, b| {
        number_value(&a.number)
            .cmp(&number_value(&b.number))
            .then_with(|| a.number.len().cmp(&b.number.len()))
    });
    candidates
}

fn number_value(number: &str) -> u32 {
    number.parse().unwrap_or(u32::MAX)
}

/// "Doe, Jane" becomes "Jane Doe"; stray punctuation is trimmed
fn normalize_name(raw: &str) -> Option<String> {
    let raw = raw.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '-' || c == '.');

    let name = match raw.split_once(',') {
        Some((last, first)) if !first.trim().is_empty() => {
            format!("{} {}", first.trim(), last.trim())
        }
        _ => raw.replace(',', ""),
    };

    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}
