//! Error types for dugout-player
//!
//! Resolution and synthesis failures are classified so the engine can turn
//! them into a `PlaybackFailed` event with the right kind.

use dugout_common::events::FailureKind;
use thiserror::Error;

/// Main error type for dugout-player
#[derive(Error, Debug)]
pub enum Error {
    /// Track, button, player or voice does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// AI voice provider refused because the account is out of quota
    #[error("Voice quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Media exists but may not be read
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Remote catalog or voice provider unreachable or misbehaving
    #[error("Network error: {0}")]
    Network(String),

    /// Data store rejected an operation
    #[error("Store error: {0}")]
    Store(#[from] dugout_store::Error),

    /// Configuration file or settings errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classification reported in `PlaybackFailed`
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::NotFound(_) => FailureKind::NotFound,
            Error::Store(dugout_store::Error::NotFound { .. }) => FailureKind::NotFound,
            Error::QuotaExceeded(_) => FailureKind::QuotaExceeded,
            Error::PermissionDenied(_) => FailureKind::PermissionDenied,
            Error::Network(_) => FailureKind::Network,
            _ => FailureKind::Internal,
        }
    }
}

impl From<dugout_common::Error> for Error {
    fn from(err: dugout_common::Error) -> Self {
        match err {
            dugout_common::Error::Database(e) => Error::Database(e),
            dugout_common::Error::Io(e) => Error::Io(e),
            dugout_common::Error::Config(msg) => Error::Config(msg),
            dugout_common::Error::NotFound(msg) => Error::NotFound(msg),
            dugout_common::Error::InvalidInput(msg) => Error::Config(msg),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

/// Convenience Result type using dugout-player Error
pub type Result<T> = std::result::Result<T, Error>;
