//! Common test infrastructure for molt-update tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Versions, payloads, and known digests
//! - `builders`: GitHub/manifest JSON bodies and in-memory archives
//! - `mock_server`: Wiremock setup helpers

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod mock_server;

pub use builders::*;
pub use constants::*;
pub use mock_server::*;
