//! GitHub releases repository

use std::path::Path;

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{build_client, ensure_success, send, stream_to_file};
use crate::checksum::{Algorithm, Checksum};
use crate::error::{Result, UpdateError};
use crate::release::Release;
use crate::version;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const GITHUB_JSON: &str = "application/vnd.github.v3+json";
const OCTET_STREAM: &str = "application/octet-stream";

/// Release object from the GitHub API
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    /// Release tag (e.g., "v3.0.0")
    pub tag_name: String,

    /// Published date
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    /// Release assets
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

/// Release asset from the GitHub API
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    /// Asset id, used by the authenticated asset endpoint
    pub id: u64,

    /// Asset name
    pub name: String,

    /// Public download URL
    pub browser_download_url: String,

    /// Content digest, e.g. "sha256:<hex>"
    #[serde(default)]
    pub digest: Option<String>,
}

/// Repository backed by GitHub releases of `owner/repo`
#[derive(Debug)]
pub struct GitHubRepository {
    owner: String,
    repo: String,
    token: Option<String>,
    asset_name: Option<String>,
    api_url: String,
    client: Client,
    debug: bool,
}

impl GitHubRepository {
    /// Create a repository for `owner/repo`, optionally authenticated
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.filter(|t| !t.is_empty()),
            asset_name: None,
            api_url: DEFAULT_API_URL.to_string(),
            client: build_client()?,
            debug: false,
        })
    }

    /// Download the asset with this exact name instead of the first asset
    pub fn with_asset_name(mut self, name: impl Into<String>) -> Self {
        self.asset_name = Some(name.into());
        self
    }

    /// Point at a different API host (GitHub Enterprise, tests)
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Get the latest published release
    pub async fn get_latest_release(&self) -> Result<Release> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url, self.owner, self.repo
        );
        if self.debug {
            debug!("Fetching latest release from URL: {}", url);
        }

        self.fetch_release(&url).await
    }

    /// Get a release by version; a missing "v" prefix is added to form the tag
    pub async fn get_release(&self, version: &str) -> Result<Release> {
        let tag = if version.starts_with('v') {
            version.to_string()
        } else {
            format!("v{}", version)
        };

        let url = format!(
            "{}/repos/{}/{}/releases/tags/{}",
            self.api_url, self.owner, self.repo, tag
        );
        if self.debug {
            debug!("Fetching release for version {} from URL: {}", tag, url);
        }

        self.fetch_release(&url).await
    }

    /// True iff `latest` is strictly newer than `current`
    pub fn compare_versions(&self, current: &str, latest: &str) -> Result<bool> {
        version::is_newer(latest, current)
    }

    /// Stream the release asset to `dest`
    ///
    /// The body is written directly to `dest` with no temp file, so a failed
    /// transfer leaves a partial file behind.
    pub async fn download(&self, release: &Release, dest: &Path) -> Result<()> {
        if release.download_url.is_empty() {
            return Err(UpdateError::MissingDownloadUrl {
                version: release.version.clone(),
            });
        }

        if self.debug {
            if release.uses_asset_api() {
                debug!(
                    "Using GitHub Asset API to download asset ID {}",
                    release.asset_id.unwrap_or_default()
                );
            }
            debug!(
                "Downloading from URL: {} to {}",
                release.download_url,
                dest.display()
            );
        }

        let request = self.authorize(
            self.client
                .get(&release.download_url)
                .header(ACCEPT, OCTET_STREAM),
        );
        let response = send(request, "downloading release asset").await?;
        let response = ensure_success(response, "Asset download").await?;
        let written = stream_to_file(response, dest).await?;

        debug!("Downloaded {} bytes to {}", written, dest.display());
        Ok(())
    }

    /// Map an API release onto a [`Release`]
    ///
    /// Picks the first asset, or the asset whose name equals the configured
    /// filter. With a token, the download URL is rewritten to the
    /// authenticated asset endpoint because the public browser URL does not
    /// accept credentials for private-repository assets.
    pub fn convert_release(&self, release: &GitHubRelease) -> Result<Release> {
        if release.assets.is_empty() {
            return Err(UpdateError::not_found(format!(
                "release {} has no assets",
                release.tag_name
            )));
        }

        if self.debug {
            debug!("Release has {} asset(s)", release.assets.len());
        }

        let asset = match &self.asset_name {
            Some(wanted) => {
                if self.debug {
                    debug!("Looking for specific asset: {}", wanted);
                }
                release
                    .assets
                    .iter()
                    .find(|a| &a.name == wanted)
                    .ok_or_else(|| {
                        UpdateError::not_found(format!("asset {} in release", wanted))
                    })?
            }
            None => &release.assets[0],
        };

        if self.debug {
            debug!("Selected asset: {} (ID: {})", asset.name, asset.id);
        }

        let download_url = if self.token.is_some() && asset.id != 0 {
            let url = self.asset_api_url(asset.id);
            if self.debug {
                debug!("Using GitHub Asset API URL: {}", url);
            }
            url
        } else {
            asset.browser_download_url.clone()
        };

        Ok(Release {
            version: release.tag_name.clone(),
            download_url,
            checksum: asset_checksum(asset),
            release_date: release.published_at,
            file_name: asset.name.clone(),
            asset_id: (asset.id != 0).then_some(asset.id),
        })
    }

    fn asset_api_url(&self, asset_id: u64) -> String {
        format!(
            "{}/repos/{}/{}/releases/assets/{}",
            self.api_url, self.owner, self.repo, asset_id
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => {
                if self.debug {
                    debug!("Request header set: Authorization: token <redacted>");
                }
                request.header(AUTHORIZATION, format!("token {}", token))
            }
            None => request,
        }
    }

    async fn fetch_release(&self, url: &str) -> Result<Release> {
        let request = self.authorize(self.client.get(url).header(ACCEPT, GITHUB_JSON));
        let response = send(request, "fetching release").await?;
        let response = ensure_success(response, "GitHub API").await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| UpdateError::network("reading release response", e))?;
        let release: GitHubRelease = serde_json::from_slice(&body)
            .map_err(|e| UpdateError::decode("GitHub release response", e))?;

        self.convert_release(&release)
    }
}

/// Only "sha256:" digests are recognized; anything else is dropped with a warning
fn asset_checksum(asset: &GitHubAsset) -> Option<Checksum> {
    let digest = asset.digest.as_deref().map(str::trim).filter(|d| !d.is_empty())?;

    match digest.strip_prefix("sha256:").map(str::trim) {
        Some(hex) if !hex.is_empty() => Some(Checksum::new(Algorithm::Sha256, hex)),
        _ => {
            warn!(
                "Ignoring unsupported digest for asset {}: {}",
                asset.name, digest
            );
            None
        }
    }
}
