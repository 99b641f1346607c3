//! Core error types for sendpace-core.
//!
//! Admission rejections are not errors: a request the allocator turns
//! down still produced a correct decision and is reported through
//! [`crate::allocator::AllocationOutcome`]. The types here cover the
//! other two legs of the taxonomy, infrastructure faults and invalid
//! input.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for sendpace-core.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Conditional commits kept losing against concurrent admissions
    #[error("Admission contended: {attempts} commit attempts conflicted")]
    Contention { attempts: u32 },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Schedule-store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open schedule store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Backing store could not serve the request
    #[error("Schedule store unavailable: {0}")]
    Unavailable(String),

    /// Conditional commit lost against a concurrent writer
    #[error("Schedule store conflict: day schedule changed since it was read")]
    Conflict,

    /// Due-window query outside the supported range
    #[error("Invalid due window: {minutes} minutes; must be between 0 and 1440")]
    InvalidDueWindow { minutes: i64 },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid gap range
    #[error("Invalid gap range: [{min}, {max}] minutes; bounds must be positive with min <= max and max within one day")]
    InvalidGapRange { min: i64, max: i64 },

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        // Conflict is reserved for the conditional commit; the SQLite
        // store classifies busy writers there. A read surfaces any
        // failure, busy included, as an outage.
        StoreError::Unavailable(err.to_string())
    }
}

/// Result type alias for ScheduleError
pub type Result<T, E = ScheduleError> = std::result::Result<T, E>;
