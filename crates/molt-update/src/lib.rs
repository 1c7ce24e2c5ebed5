//! Release acquisition and installation for Molt
//!
//! Provides:
//! - Version parsing and ordering
//! - SHA-256/SHA-1/MD5 checksum verification
//! - GitHub releases and HTTP manifest repositories
//! - Atomic binary replacement and zip-slip-safe archive extraction
//! - A one-shot check/download/verify/apply updater

pub mod applier;
pub mod checksum;
pub mod error;
pub mod release;
pub mod repository;
pub mod updater;
pub mod version;

pub use applier::{Applier, ApplierKind, ArchiveApplier, BinaryApplier};
pub use checksum::{calculate_sha256, verify_checksum, verify_sha256, Algorithm, Checksum};
pub use error::{Result, UpdateError};
pub use release::Release;
pub use repository::{GitHubRepository, HttpRepository, Repository, RepositoryKind};
pub use updater::{CheckResult, UpdateResult, Updater};
pub use version::Version;

/// Current molt version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
