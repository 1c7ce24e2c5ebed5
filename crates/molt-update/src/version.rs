//! Version parsing and ordering
//!
//! Versions look like `[v]MAJOR.MINOR.PATCH[-prerelease][+build]`. Ordering
//! compares the numeric triple first; a release outranks any prerelease of
//! the same triple, and two prereleases compare byte-wise as whole strings.
//! Build metadata never takes part in ordering or equality.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, UpdateError};

/// Parsed semantic-version-like value
#[derive(Debug, Clone, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Empty when the version is a release
    pub pre_release: String,
    /// Ignored by comparison
    pub build: String,
}

impl Version {
    /// Parse a version string, accepting an optional leading `v`
    pub fn parse(input: &str) -> Result<Self> {
        let rest = input.strip_prefix('v').unwrap_or(input);

        let (rest, build) = match rest.split_once('+') {
            Some((core, build)) => (core, build.to_string()),
            None => (rest, String::new()),
        };

        let (core, pre_release) = match rest.split_once('-') {
            Some((core, pre)) => (core, pre.to_string()),
            None => (rest, String::new()),
        };

        let mut parts = core.split('.');
        let (Some(major), Some(minor), Some(patch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(UpdateError::invalid_format("version", input));
        };

        Ok(Self {
            major: parse_component(major, input)?,
            minor: parse_component(minor, input)?,
            patch: parse_component(patch, input)?,
            pre_release,
            build,
        })
    }

    /// True when this version has no prerelease tag
    pub fn is_release(&self) -> bool {
        self.pre_release.is_empty()
    }
}

fn parse_component(part: &str, input: &str) -> Result<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UpdateError::invalid_format("version", input));
    }
    part.parse()
        .map_err(|_| UpdateError::invalid_format("version", input))
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (self.is_release(), other.is_release()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre_release.as_bytes().cmp(other.pre_release.as_bytes()),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl FromStr for Version {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre_release.is_empty() {
            write!(f, "-{}", self.pre_release)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

/// Compare two version strings, failing if either does not parse
pub fn compare(v1: &str, v2: &str) -> Result<Ordering> {
    Ok(Version::parse(v1)?.cmp(&Version::parse(v2)?))
}

/// True iff `v1` is strictly newer than `v2`
pub fn is_newer(v1: &str, v2: &str) -> Result<bool> {
    Ok(compare(v1, v2)? == Ordering::Greater)
}
