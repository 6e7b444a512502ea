//! # Error Taxonomy
//!
//! Typed errors for the three failure families of the todo core. None of
//! them is fatal: validation errors are returned to the caller before any
//! state changes, persistence and scheduling errors are absorbed by the
//! store and only logged.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Rejected user input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Title was empty after trimming whitespace
    #[error("title must not be empty")]
    EmptyTitle,
}

/// Read or write failure against the backing store
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize todo list: {0}")]
    Serialize(#[source] serde_json::Error),

    /// File exists but does not hold a valid item list
    #[error("malformed todo file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PersistenceError {
    /// True when the underlying cause is a missing file
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistenceError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Reminder could not be scheduled
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulingError {
    #[error("permission to deliver reminders was not granted")]
    PermissionDenied,

    #[error("fire time {fire_at} is not in the future")]
    FireTimeInPast { fire_at: DateTime<Utc> },

    /// Any other rejection from the underlying platform
    #[error("reminder platform rejected the request: {0}")]
    Platform(String),
}
