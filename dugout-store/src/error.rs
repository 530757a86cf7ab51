//! Error types for dugout-store
//!
//! Precondition failures are reported before any mutation happens, so an
//! `Err` from a store operation always means the graph is unchanged.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the data store
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    /// Attempt to delete the only remaining team event
    #[error("Cannot delete the last team event")]
    CannotDeleteLastScope,

    /// Reorder index outside the scope
    #[error("Index {index} out of range for scope of {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// Name already used within the same scope
    #[error("Duplicate name in scope: {0}")]
    DuplicateName(String),

    /// Invalid entity content
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Snapshot persistence errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Snapshot encoding errors
    #[error("Snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn not_found(kind: &'static str, id: Uuid) -> Self {
        Error::NotFound { kind, id }
    }
}

/// Convenience Result type using the store Error
pub type Result<T> = std::result::Result<T, Error>;
