//! Audio output seam
//!
//! The engine never touches a device directly. It drives an [`AudioOutput`]
//! with start/level/stop commands per lane; implementations decide what
//! "audible" means.

pub mod output;
#[cfg(feature = "rodio-output")]
pub mod rodio_output;

pub use output::{AudioOutput, Lane, Playable, TracingOutput};
#[cfg(feature = "rodio-output")]
pub use rodio_output::RodioOutput;
