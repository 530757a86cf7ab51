//! HTTP control surface
//!
//! Provides REST endpoints for playback control and SSE for real-time
//! transport and store updates.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};
