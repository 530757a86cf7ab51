//! Database access for dugout-player

pub mod settings;
