//! HTTP manifest repository
//!
//! The manifest is a JSON array of `{version, url, md5?, sha1?, sha256?}`
//! objects served from a single URL.

use std::fs;
use std::path::Path;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{build_client, ensure_success, send, stream_to_file};
use crate::checksum::ChecksumSet;
use crate::error::{Result, UpdateError};
use crate::release::Release;
use crate::version::{self, Version};

/// Fallback file name when a URL has no usable last path segment
const DEFAULT_FILE_NAME: &str = "download";

/// One release entry in the manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub version: String,
    pub url: String,
    #[serde(flatten)]
    pub checksums: ChecksumSet,
}

/// Repository backed by a JSON release manifest
#[derive(Debug)]
pub struct HttpRepository {
    url: String,
    client: Client,
    debug: bool,
}

impl HttpRepository {
    /// Create a repository reading the manifest at `url`
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            client: build_client()?,
            debug: false,
        })
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the manifest
    pub async fn fetch_manifest(&self) -> Result<Vec<ManifestEntry>> {
        if self.debug {
            debug!("Fetching releases from URL: {}", self.url);
        }

        let response = send(self.client.get(&self.url), "fetching releases").await?;
        let response = ensure_success(response, "Release manifest").await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| UpdateError::network("reading release manifest", e))?;
        let entries: Vec<ManifestEntry> = serde_json::from_slice(&body)
            .map_err(|e| UpdateError::decode("release manifest", e))?;

        if self.debug {
            debug!("Fetched {} release(s)", entries.len());
        }
        Ok(entries)
    }

    /// Scan the whole manifest for the highest version
    pub async fn get_latest_release(&self) -> Result<Release> {
        let entries = self.fetch_manifest().await?;

        let latest = select_latest(&entries)
            .ok_or_else(|| UpdateError::not_found("no valid release in manifest"))?;

        if self.debug {
            debug!("Latest release: {}", latest.version);
        }
        Ok(self.convert_entry(latest))
    }

    /// First entry whose version string matches exactly
    pub async fn get_release(&self, version: &str) -> Result<Release> {
        let entries = self.fetch_manifest().await?;

        if self.debug {
            debug!("Looking for release version: {}", version);
        }

        entries
            .iter()
            .find(|entry| entry.version == version)
            .map(|entry| self.convert_entry(entry))
            .ok_or_else(|| UpdateError::not_found(format!("release version {}", version)))
    }

    /// True iff `latest` is strictly newer than `current`
    pub fn compare_versions(&self, current: &str, latest: &str) -> Result<bool> {
        version::is_newer(latest, current)
    }

    /// Stream the artifact to `dest`, then enforce its checksum
    ///
    /// On checksum failure the downloaded file is removed before the error is
    /// returned, so nothing corrupt is left for a later apply.
    pub async fn download(&self, release: &Release, dest: &Path) -> Result<()> {
        if release.download_url.is_empty() {
            return Err(UpdateError::MissingDownloadUrl {
                version: release.version.clone(),
            });
        }

        if self.debug {
            debug!(
                "Downloading from URL: {} to {}",
                release.download_url,
                dest.display()
            );
        }

        let response = send(self.client.get(&release.download_url), "downloading release").await?;
        let response = ensure_success(response, "Download").await?;
        stream_to_file(response, dest).await?;

        match &release.checksum {
            Some(checksum) => {
                if self.debug {
                    debug!("Verifying checksum: {}", checksum);
                }
                if let Err(e) = checksum.verify(dest) {
                    if let Err(remove_err) = fs::remove_file(dest) {
                        warn!(
                            "Failed to remove corrupt download {}: {}",
                            dest.display(),
                            remove_err
                        );
                    }
                    return Err(e);
                }
                if self.debug {
                    debug!("Checksum verification passed");
                }
            }
            None => warn!(
                "No checksum available for version {}; skipping verification",
                release.version
            ),
        }

        Ok(())
    }

    /// Map a manifest entry onto a [`Release`]
    pub fn convert_entry(&self, entry: &ManifestEntry) -> Release {
        let checksum = entry.checksums.select();
        if self.debug {
            match &checksum {
                Some(c) => debug!("Selected {} checksum: {}", c.algorithm, c.digest),
                None => debug!("No checksum available for version {}", entry.version),
            }
        }

        let download_url = self.resolve(&entry.url);
        let file_name = file_name_from_url(&download_url);

        Release {
            version: entry.version.clone(),
            download_url,
            checksum,
            release_date: None,
            file_name,
            asset_id: None,
        }
    }

    /// Resolve an entry URL against the manifest URL; absolute URLs pass through
    fn resolve(&self, entry_url: &str) -> String {
        Url::parse(&self.url)
            .and_then(|base| base.join(entry_url))
            .map(String::from)
            .unwrap_or_else(|_| entry_url.to_string())
    }
}

/// Highest parseable version; unparseable entries are skipped, ties keep the first
pub fn select_latest(entries: &[ManifestEntry]) -> Option<&ManifestEntry> {
    let mut latest: Option<(&ManifestEntry, Version)> = None;

    for entry in entries {
        let parsed = match Version::parse(&entry.version) {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping manifest entry: {}", e);
                continue;
            }
        };

        let replace = match &latest {
            Some((_, best)) => parsed > *best,
            None => true,
        };
        if replace {
            latest = Some((entry, parsed));
        }
    }

    latest.map(|(entry, _)| entry)
}

fn file_name_from_url(url: &str) -> String {
    let from_path = Url::parse(url).ok().and_then(|u| {
        u.path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
    });

    from_path
        .or_else(|| url.rsplit('/').next().map(str::to_string))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Algorithm;

    fn entry(version: &str) -> ManifestEntry {
        ManifestEntry {
            version: version.to_string(),
            url: format!("https://example.com/app-{}.tar.gz", version),
            checksums: ChecksumSet::default(),
        }
    }

    #[test]
    fn test_select_latest_unsorted() {
        let entries = vec![entry("2.0.0"), entry("3.0.0"), entry("1.0.0")];
        assert_eq!(select_latest(&entries).unwrap().version, "3.0.0");
    }

    #[test]
    fn test_select_latest_skips_unparseable() {
        let entries = vec![entry("nightly"), entry("1.2.0"), entry("latest"), entry("1.10.0")];
        assert_eq!(select_latest(&entries).unwrap().version, "1.10.0");
    }

    #[test]
    fn test_select_latest_empty_or_invalid() {
        assert!(select_latest(&[]).is_none());
        assert!(select_latest(&[entry("foo"), entry("bar")]).is_none());
    }

    #[test]
    fn test_select_latest_prefers_release_over_prerelease() {
        let entries = vec![entry("2.0.0-rc.1"), entry("2.0.0"), entry("2.0.0-beta")];
        assert_eq!(select_latest(&entries).unwrap().version, "2.0.0");
    }

    #[test]
    fn test_manifest_entry_parsing() {
        let entries: Vec<ManifestEntry> = serde_json::from_str(
            r#"[{"version": "1.0.0", "url": "https://x/a.zip", "md5": "m", "sha1": "s"}]"#,
        )
        .unwrap();
        let checksum = entries[0].checksums.select().unwrap();
        assert_eq!(checksum.algorithm, Algorithm::Sha1);
        assert_eq!(checksum.digest, "s");
    }

    #[test]
    fn test_convert_entry_resolves_relative_url() {
        let repo = HttpRepository::new("https://updates.example.com/app/releases.json").unwrap();
        let release = repo.convert_entry(&ManifestEntry {
            version: "1.0.0".to_string(),
            url: "files/app-1.0.0.zip".to_string(),
            checksums: ChecksumSet {
                sha256: Some("abc".to_string()),
                ..Default::default()
            },
        });

        assert_eq!(
            release.download_url,
            "https://updates.example.com/app/files/app-1.0.0.zip"
        );
        assert_eq!(release.file_name, "app-1.0.0.zip");
        assert_eq!(release.checksum.unwrap().to_string(), "sha256:abc");
        assert!(release.asset_id.is_none());
        assert!(release.release_date.is_none());
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(file_name_from_url("https://x/y/tool.tgz?sig=1"), "tool.tgz");
        assert_eq!(file_name_from_url("https://x/"), DEFAULT_FILE_NAME);
        assert_eq!(file_name_from_url("not a url/tool.bin"), "tool.bin");
    }
}
