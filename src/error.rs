//! Error handling for the sweep pipeline
//!
//! This module defines custom error types and a Result alias for use
//! throughout the crate.

use thiserror::Error;

/// Main error type for sweep pipeline operations
#[derive(Error, Debug)]
pub enum SweepVisError {
    /// Errors from the serial port layer
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Errors while acquiring a sweep from the device
    #[error("Acquisition error: {0}")]
    Acquisition(String),

    /// Malformed data received from the device
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected band-switch configuration string
    #[error("Device config error: {0}")]
    DeviceConfig(String),

    /// A single I/O-expander write failed
    #[error("Expander write error at address 0x{address:02X}: {message}")]
    ExpanderWrite { address: u8, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SweepVisError>,
    },
}

impl SweepVisError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SweepVisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for sweep pipeline operations
pub type Result<T> = std::result::Result<T, SweepVisError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
