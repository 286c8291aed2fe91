//! Error handling for Serial Scope
//!
//! This module defines the error taxonomy and a Result alias for use
//! throughout the application.
//!
//! Only connection and read errors terminate an acquisition session; parse
//! errors are recovered inside the acquisition loop and surface as counters
//! rather than as `Err` values.

use thiserror::Error;

/// Main error type for Serial Scope operations
#[derive(Error, Debug)]
pub enum ScopeError {
    /// Buffer misconfiguration, fatal at construction
    #[error("invalid buffer capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    /// The serial device could not be opened
    #[error("connection error: {0}")]
    Connection(String),

    /// I/O failure mid-stream (device unplugged, read fault)
    #[error("read error: {0}")]
    Read(String),

    /// A line that could not be parsed as a raw ADC code
    #[error("malformed sample line: {0:?}")]
    Parse(String),

    /// Errors related to configuration loading/saving
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serialport::Error> for ScopeError {
    fn from(err: serialport::Error) -> Self {
        ScopeError::Connection(err.to_string())
    }
}

/// Result type alias for Serial Scope operations
pub type Result<T> = std::result::Result<T, ScopeError>;
