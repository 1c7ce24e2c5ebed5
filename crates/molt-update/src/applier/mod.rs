//! Installing a verified artifact
//!
//! Two closed variants: an atomic single-file swap and an archive extraction.
//! Both leave the target untouched when a failure is detected before commit.

pub mod archive;
pub mod binary;
pub mod safe_path;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, UpdateError};

pub use archive::{ArchiveApplier, ArchiveFormat};
pub use binary::BinaryApplier;
pub use safe_path::safe_join;

/// Applier type tag as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplierKind {
    Binary,
    Archive,
}

impl FromStr for ApplierKind {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "binary" => Ok(Self::Binary),
            "archive" => Ok(Self::Archive),
            other => Err(UpdateError::UnknownVariant {
                kind: "applier",
                tag: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ApplierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => f.write_str("binary"),
            Self::Archive => f.write_str("archive"),
        }
    }
}

/// A configured installation strategy
#[derive(Debug, Clone)]
pub enum Applier {
    Binary(BinaryApplier),
    Archive(ArchiveApplier),
}

impl Applier {
    /// Build the variant named by `kind`; `extract_path` only matters for archives
    pub fn from_config(kind: &str, extract_path: Option<&Path>) -> Result<Self> {
        match kind.parse::<ApplierKind>()? {
            ApplierKind::Binary => Ok(Self::Binary(BinaryApplier::new())),
            ApplierKind::Archive => Ok(Self::Archive(match extract_path {
                Some(path) => ArchiveApplier::with_extract_path(PathBuf::from(path)),
                None => ArchiveApplier::new(),
            })),
        }
    }

    pub fn kind(&self) -> ApplierKind {
        match self {
            Self::Binary(_) => ApplierKind::Binary,
            Self::Archive(_) => ApplierKind::Archive,
        }
    }

    /// Install `source` at `target`
    pub fn apply(&self, source: &Path, target: &Path) -> Result<()> {
        match self {
            Self::Binary(applier) => applier.apply(source, target),
            Self::Archive(applier) => applier.apply(source, target),
        }
    }
}
