//! Error types for remotelist
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ListError
pub type Result<T> = std::result::Result<T, ListError>;

/// Unified error type for remotelist operations
#[derive(Debug, Error)]
pub enum ListError {
    // -------------------------------------------------------------------------
    // List Errors (reported to callers)
    // -------------------------------------------------------------------------
    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("List is empty: {0}")]
    EmptyList(String),

    #[error("Index {index} out of range for list of size {size}")]
    IndexOutOfRange { index: i32, size: i32 },

    #[error("Invalid list id: {0:?}")]
    InvalidListId(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Malformed log record: {0}")]
    MalformedLogRecord(String),

    #[error("Cannot open persistent state at startup: {0}")]
    StartupPersistence(String),

    #[error("Snapshot corruption detected: {0}")]
    SnapshotCorruption(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ListError {
    /// Whether this error is a caller-level outcome (bad id, empty list, ...)
    /// rather than a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ListError::ListNotFound(_)
                | ListError::EmptyList(_)
                | ListError::IndexOutOfRange { .. }
                | ListError::InvalidListId(_)
        )
    }
}
