//! Release sources
//!
//! A [`Repository`] turns an external release source into normalized
//! [`Release`] values and transfers the selected artifact to disk. The set of
//! sources is closed: GitHub releases and a plain HTTP manifest.

pub mod github;
pub mod http;

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use futures_util::StreamExt;
use molt_core::RepositoryConfig;
use reqwest::{Client, RequestBuilder, Response};

use crate::error::{Result, UpdateError};
use crate::release::Release;

pub use github::GitHubRepository;
pub use http::HttpRepository;

/// User agent sent with every request
pub const USER_AGENT: &str = "molt-updater";

/// Overall per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Repository type tag as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    GitHub,
    Http,
}

impl FromStr for RepositoryKind {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "github" => Ok(Self::GitHub),
            "http" => Ok(Self::Http),
            other => Err(UpdateError::UnknownVariant {
                kind: "repository",
                tag: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitHub => f.write_str("github"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// A configured release source
#[derive(Debug)]
pub enum Repository {
    GitHub(GitHubRepository),
    Http(HttpRepository),
}

impl Repository {
    /// Build the repository variant named by the configuration's type tag
    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        match config.kind.parse::<RepositoryKind>()? {
            RepositoryKind::GitHub => {
                let (Some(owner), Some(repo)) = (config.owner(), config.repo()) else {
                    return Err(UpdateError::invalid_format(
                        "repository",
                        "github repository requires owner and repo",
                    ));
                };
                let mut repository =
                    GitHubRepository::new(owner, repo, config.token().map(String::from))?;
                if let Some(asset_name) = config.asset_name() {
                    repository = repository.with_asset_name(asset_name);
                }
                Ok(Self::GitHub(repository))
            }
            RepositoryKind::Http => {
                let url = config.url().ok_or_else(|| {
                    UpdateError::invalid_format("repository", "http repository requires url")
                })?;
                Ok(Self::Http(HttpRepository::new(url)?))
            }
        }
    }

    /// Which variant this is
    pub fn kind(&self) -> RepositoryKind {
        match self {
            Self::GitHub(_) => RepositoryKind::GitHub,
            Self::Http(_) => RepositoryKind::Http,
        }
    }

    /// Fetch the newest release
    pub async fn get_latest_release(&self) -> Result<Release> {
        match self {
            Self::GitHub(repo) => repo.get_latest_release().await,
            Self::Http(repo) => repo.get_latest_release().await,
        }
    }

    /// Fetch a specific release by version
    pub async fn get_release(&self, version: &str) -> Result<Release> {
        match self {
            Self::GitHub(repo) => repo.get_release(version).await,
            Self::Http(repo) => repo.get_release(version).await,
        }
    }

    /// True iff `latest` is strictly newer than `current`
    pub fn compare_versions(&self, current: &str, latest: &str) -> Result<bool> {
        match self {
            Self::GitHub(repo) => repo.compare_versions(current, latest),
            Self::Http(repo) => repo.compare_versions(current, latest),
        }
    }

    /// Transfer the release artifact to `dest`
    pub async fn download(&self, release: &Release, dest: &Path) -> Result<()> {
        match self {
            Self::GitHub(repo) => repo.download(release, dest).await,
            Self::Http(repo) => repo.download(release, dest).await,
        }
    }

    /// Toggle the diagnostic side channel
    pub fn set_debug(&mut self, enabled: bool) {
        match self {
            Self::GitHub(repo) => repo.set_debug(enabled),
            Self::Http(repo) => repo.set_debug(enabled),
        }
    }
}

pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| UpdateError::network("building HTTP client", e))
}

pub(crate) async fn send(request: RequestBuilder, context: &str) -> Result<Response> {
    request
        .send()
        .await
        .map_err(|e| UpdateError::network(context, e))
}

/// Pass successful responses through; turn anything else into a protocol error
pub(crate) async fn ensure_success(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(UpdateError::Protocol {
        context: context.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// Stream a response body straight into `dest`, creating parent directories
///
/// Writes in place: a failure part way leaves a partial file at `dest`.
pub(crate) async fn stream_to_file(response: Response, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            UpdateError::io(
                format!("Failed to create destination directory {}", parent.display()),
                e,
            )
        })?;
    }

    let mut file = File::create(dest)
        .map_err(|e| UpdateError::io(format!("Failed to create {}", dest.display()), e))?;

    let mut written = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk: bytes::Bytes =
            chunk_result.map_err(|e| UpdateError::network("reading download body", e))?;
        file.write_all(&chunk)
            .map_err(|e| UpdateError::io(format!("Failed to write {}", dest.display()), e))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .map_err(|e| UpdateError::io(format!("Failed to flush {}", dest.display()), e))?;

    Ok(written)
}
