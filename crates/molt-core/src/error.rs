//! Error types for molt-core

use thiserror::Error;

/// Result type alias using molt-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Molt
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parsed but failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Configuration already exists where a new one would be written
    #[error("Configuration file already exists at {path}")]
    ConfigExists { path: String },

    /// JSON parsing error (includes unknown keys)
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a config exists error
    pub fn config_exists(path: impl Into<String>) -> Self {
        Self::ConfigExists { path: path.into() }
    }
}
