// src/error.rs

//! Shared error taxonomy for the update agent
//!
//! Every fallible operation in this crate returns `Result<T>` with a typed
//! error carrying a human-readable message. Invariant violations that cannot
//! happen given correct upstream validation are asserted, not returned:
//! recovering from them would mask a logic bug elsewhere.

use thiserror::Error;

/// Result type for update-agent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the update-agent state core
///
/// The variants past `DatabaseValue` are surfaced by adjacent update-flow
/// components that share this taxonomy; this core itself never produces them.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed stored blob or device-type file
    #[error("parse error: {0}")]
    Parse(String),

    /// Semantically invalid content, e.g. a missing required provides field
    #[error("value error: {0}")]
    Value(String),

    /// Value read from the store is invalid or corrupted
    #[error("value in database is invalid or corrupted: {0}")]
    DatabaseValue(String),

    /// No update module found for the given artifact payload type
    #[error("update module not found for payload type '{0}'")]
    NoSuchUpdateModule(String),

    /// The deployment cannot continue until the device reboots
    #[error("reboot required")]
    RebootRequired,

    /// A resume/commit operation found no deployment in progress
    #[error("no update in progress")]
    NoUpdateInProgress,

    /// State data was stored more times than the allowed maximum
    #[error("state data store count exceeded")]
    StateDataStoreCountExceeded,

    /// Server replied outside the accepted status range
    #[error("unexpected HTTP response: {0}")]
    UnexpectedHttpResponse(String),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding of a stored blob failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a parse error with a message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a value error with a message
    pub fn value(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }
}
