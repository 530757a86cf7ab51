//! Playback engine module
//!
//! **Module Structure:**
//! - `core.rs`: Engine struct, status accessors, stop and failure handling
//! - `transport.rs`: Per-transport state machine and play tokens
//! - `playback.rs`: Button and song playback, progress, fades
//! - `announce.rs`: Player announcement sequence
//! - `preview.rs`: Preview transport and voice preview

mod announce;
mod core;
mod playback;
mod preview;
mod transport;

pub use self::core::PlaybackEngine;
pub use playback::clamp_offset;
pub use transport::TransportStatus;
