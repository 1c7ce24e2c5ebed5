//! Provider-independent release metadata

use chrono::{DateTime, Utc};

use crate::checksum::Checksum;

/// One installable build, normalized across repository providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Version string as published (e.g. "v3.0.0" for a GitHub tag)
    pub version: String,

    /// Where the artifact is fetched from
    pub download_url: String,

    /// Expected digest of the artifact, if the provider offers one
    pub checksum: Option<Checksum>,

    /// Publication time, if the provider reports one
    pub release_date: Option<DateTime<Utc>>,

    /// Artifact file name used for the local download
    pub file_name: String,

    /// Provider-specific asset id (GitHub only)
    pub asset_id: Option<u64>,
}

impl Release {
    /// True when the download URL points at the token-authenticated asset endpoint
    pub fn uses_asset_api(&self) -> bool {
        self.download_url.contains("/releases/assets/")
    }
}
