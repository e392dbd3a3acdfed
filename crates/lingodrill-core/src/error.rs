//! Error types.
//!
//! Rejected learner actions (answering twice, skipping when skipping is off)
//! are not errors; they come back as [`crate::session::AnswerOutcome`] values.
//! These types cover the failures a caller has to handle.

use thiserror::Error;

/// Errors from a key-value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key cannot be used by this backend.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Reading or writing the backing storage failed.
    #[error("storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded.
    #[error("failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend is unavailable (e.g. a poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from talking to a running session engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The session task has stopped and no longer accepts commands.
    #[error("session engine is closed")]
    Closed,

    /// The session task panicked.
    #[error("session engine failed: {0}")]
    Failed(String),
}

/// A session whose bookkeeping does not add up, e.g. a tampered checkpoint.
#[derive(Debug, Error)]
#[error("inconsistent session: {0}")]
pub struct InvalidSession(String);

impl InvalidSession {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
