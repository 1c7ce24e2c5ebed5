//! Error taxonomy for the update pipeline
//!
//! Every failure propagates synchronously to the immediate caller. Nothing in
//! this crate retries.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using molt-update's error type
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors produced while acquiring, verifying, or applying a release
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Request construction or transport failure
    #[error("Network error while {context}: {source}")]
    Network {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("{context} returned status {status}: {body}")]
    Protocol {
        context: String,
        status: u16,
        body: String,
    },

    /// Malformed JSON document or archive stream
    #[error("Failed to decode {context}: {message}")]
    Decode { context: String, message: String },

    /// Computed digest does not match the expected one
    #[error("{algorithm} mismatch: expected {expected}, got {actual}")]
    Integrity {
        algorithm: String,
        expected: String,
        actual: String,
    },

    /// Archive entry would be written outside the extraction root
    #[error("Illegal file path in archive: {entry} escapes {}", .root.display())]
    PathTraversal { entry: String, root: PathBuf },

    /// No matching asset, version, or release
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unparseable version or checksum string
    #[error("Invalid {kind} format: {value}")]
    InvalidFormat { kind: &'static str, value: String },

    /// Checksum names an algorithm outside sha256/sha1/md5
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Archive suffix is not .zip, .tar.gz, or .tgz
    #[error("Unsupported archive format: {}", .0.display())]
    UnsupportedArchive(PathBuf),

    /// Configuration names a repository or applier type that does not exist
    #[error("Unknown {kind} type: {tag}")]
    UnknownVariant { kind: &'static str, tag: String },

    /// Download requested for a release without a URL
    #[error("Release {version} has no download URL")]
    MissingDownloadUrl { version: String },

    /// Applier source is missing or not a regular file
    #[error("Source is not a regular file: {}", .0.display())]
    InvalidSource(PathBuf),

    /// Filesystem failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    /// Create a network error
    pub fn network(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            context: context.into(),
            source,
        }
    }

    /// Create a decode error
    pub fn decode(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an invalid format error
    pub fn invalid_format(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidFormat {
            kind,
            value: value.into(),
        }
    }

    /// Create a path traversal error
    pub fn path_traversal(entry: impl Into<String>, root: &Path) -> Self {
        Self::PathTraversal {
            entry: entry.into(),
            root: root.to_path_buf(),
        }
    }

    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// True for errors raised by the archive path-traversal defense
    pub fn is_security(&self) -> bool {
        matches!(self, Self::PathTraversal { .. })
    }
}
