//! Core error types for salaryflow-core.
//!
//! Every failure is local and recoverable: the worst case is a rejected
//! user action with a message. Callers decide how to surface it.

use thiserror::Error;

/// Core error type for salaryflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Non-numeric or non-positive salary, bad hours per day, bad preference value.
    #[error("Invalid input for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    /// Work schedule that yields no working time to divide by.
    #[error("Invalid work schedule: {0}")]
    InvalidSchedule(String),

    /// Key-value store unavailable or failing.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Export requested while the record history is empty.
    #[error("Nothing to export: no records")]
    NothingToExport,

    /// Currency code missing from the active rate table.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Exchange-rate fetch failed.
    #[error("Network error: {0}")]
    Network(String),

    /// Tick driver task is gone; commands can no longer reach the engine.
    #[error("Timer driver has stopped")]
    DriverStopped,

    /// Exchange-rate update refused because offline mode is enabled.
    #[error("Offline mode is enabled; exchange rates were not updated")]
    Offline,

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CoreError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: String, message: String },

    /// Read of a key failed
    #[error("Failed to read key '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Write of a key failed
    #[error("Failed to write key '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// Store is locked by another process
    #[error("Store is locked")]
    Locked,
}

impl PersistenceError {
    pub(crate) fn read(key: &str, err: impl std::fmt::Display) -> Self {
        PersistenceError::ReadFailed {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(key: &str, err: impl std::fmt::Display) -> Self {
        PersistenceError::WriteFailed {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
