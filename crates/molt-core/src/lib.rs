//! # molt-core
//!
//! Core library for the Molt self-updater providing:
//! - Configuration file parsing and validation (molt.json)
//! - Configuration persistence after a successful update
//! - Shared error types

pub mod config;
pub mod error;

pub use config::{default_config_path, Config, RepositoryConfig};
pub use error::{Error, Result};
