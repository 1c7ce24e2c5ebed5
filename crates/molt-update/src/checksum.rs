//! Content hashing and checksum verification
//!
//! Two verification contracts live here and are deliberately kept apart:
//!
//! - [`verify_sha256`] answers a question. A mismatch is `Ok(false)` and the
//!   caller decides what to do with the file; only I/O failure is an error.
//! - [`verify_checksum`] enforces a policy. It takes the `algorithm:hex` wire
//!   form and turns a mismatch into [`UpdateError::Integrity`].

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use serde::Deserialize;
use sha1::Sha1;
use sha2::digest::Output;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Result, UpdateError};

/// Read buffer size for streaming hashes (64KB)
const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Supported digest algorithms, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Sha256,
    Sha1,
    Md5,
}

impl Algorithm {
    /// Wire name used in `algorithm:hex` strings
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
        }
    }

    /// Stream `path` through this algorithm and return the lowercase hex digest
    pub fn hash_file(self, path: &Path) -> Result<String> {
        match self {
            Self::Sha256 => hash_file::<Sha256>(path),
            Self::Sha1 => hash_file::<Sha1>(path),
            Self::Md5 => hash_file::<Md5>(path),
        }
    }
}

impl FromStr for Algorithm {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "sha1" => Ok(Self::Sha1),
            "md5" => Ok(Self::Md5),
            other => Err(UpdateError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `algorithm:hexdigest` checksum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    pub algorithm: Algorithm,
    /// Hex digest as supplied; compared case-insensitively
    pub digest: String,
}

impl Checksum {
    pub fn new(algorithm: Algorithm, digest: impl Into<String>) -> Self {
        Self {
            algorithm,
            digest: digest.into(),
        }
    }

    /// Parse the `algorithm:hexdigest` wire form
    pub fn parse(input: &str) -> Result<Self> {
        let (algorithm, digest) = input
            .split_once(':')
            .ok_or_else(|| UpdateError::invalid_format("checksum", input))?;

        let digest = digest.trim();
        if algorithm.is_empty() || digest.is_empty() {
            return Err(UpdateError::invalid_format("checksum", input));
        }

        Ok(Self {
            algorithm: algorithm.parse()?,
            digest: digest.to_string(),
        })
    }

    /// Hash `path` and fail with [`UpdateError::Integrity`] on mismatch
    pub fn verify(&self, path: &Path) -> Result<()> {
        let actual = self.algorithm.hash_file(path)?;

        if !actual.eq_ignore_ascii_case(&self.digest) {
            return Err(UpdateError::Integrity {
                algorithm: self.algorithm.to_string(),
                expected: self.digest.to_ascii_lowercase(),
                actual,
            });
        }

        debug!("{} checksum verified for {}", self.algorithm, path.display());
        Ok(())
    }
}

impl FromStr for Checksum {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

/// Checksums offered side by side for one artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChecksumSet {
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub md5: Option<String>,
}

impl ChecksumSet {
    /// Pick the strongest populated checksum: sha256, then sha1, then md5
    pub fn select(&self) -> Option<Checksum> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        present(&self.sha256)
            .map(|d| Checksum::new(Algorithm::Sha256, d))
            .or_else(|| present(&self.sha1).map(|d| Checksum::new(Algorithm::Sha1, d)))
            .or_else(|| present(&self.md5).map(|d| Checksum::new(Algorithm::Md5, d)))
    }
}

/// Calculate the SHA-256 of a file as lowercase hex
pub fn calculate_sha256(path: &Path) -> Result<String> {
    hash_file::<Sha256>(path)
}

/// Compare a file's SHA-256 with `expected` (trimmed, case-insensitive)
///
/// Returns `Ok(false)` on mismatch. Errors only when the file cannot be read.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<bool> {
    let actual = calculate_sha256(path)?;
    Ok(actual.eq_ignore_ascii_case(expected.trim()))
}

/// Verify a file against an `algorithm:hex` checksum string
///
/// Malformed input, an unsupported algorithm, and a digest mismatch are all
/// errors.
pub fn verify_checksum(path: &Path, checksum: &str) -> Result<()> {
    Checksum::parse(checksum)?.verify(path)
}

fn hash_file<D>(path: &Path) -> Result<String>
where
    D: Digest,
    Output<D>: fmt::LowerHex,
{
    let mut file = File::open(path)
        .map_err(|e| UpdateError::io(format!("Failed to open {}", path.display()), e))?;
    let mut hasher = D::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| UpdateError::io(format!("Failed to read {}", path.display()), e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
