//! One check/download/verify/apply cycle
//!
//! The updater wires a [`Repository`] to an [`Applier`]:
//! 1. Fetch the latest release
//! 2. Skip when the current version is already at or past it
//! 3. Download into the download directory
//! 4. Verify the artifact according to the provider's policy
//! 5. Apply it to the target
//!
//! Persisting the new version is left to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use molt_core::Config;
use tracing::{debug, info, warn};

use crate::applier::{safe_join, Applier};
use crate::checksum::{self, Algorithm};
use crate::error::{Result, UpdateError};
use crate::release::Release;
use crate::repository::{Repository, RepositoryKind};

/// Outcome of a version check
#[derive(Debug, Clone)]
pub enum CheckResult {
    /// Latest release is newer than the current version
    UpdateAvailable { current: String, latest: Release },

    /// Current version is at or past the latest release
    UpToDate { current: String, latest: Release },

    /// No current version is recorded, so nothing to compare against
    NoCurrentVersion { latest: Release },
}

impl CheckResult {
    pub fn latest(&self) -> &Release {
        match self {
            Self::UpdateAvailable { latest, .. }
            | Self::UpToDate { latest, .. }
            | Self::NoCurrentVersion { latest } => latest,
        }
    }

    pub fn is_update_available(&self) -> bool {
        matches!(self, Self::UpdateAvailable { .. })
    }
}

/// Outcome of an update run
#[derive(Debug, Clone)]
pub enum UpdateResult {
    /// Nothing to do; carries the latest published version
    AlreadyUpToDate(String),

    /// Release applied to the target
    Updated {
        from: Option<String>,
        to: String,
        target: PathBuf,
        download: PathBuf,
    },
}

/// Drives one update cycle for a single target
#[derive(Debug)]
pub struct Updater {
    repository: Repository,
    applier: Applier,
    download_dir: PathBuf,
    target_path: PathBuf,
}

impl Updater {
    pub fn new(
        repository: Repository,
        applier: Applier,
        download_dir: impl Into<PathBuf>,
        target_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository,
            applier,
            download_dir: download_dir.into(),
            target_path: target_path.into(),
        }
    }

    /// Build both variants from their configuration type tags
    pub fn from_config(config: &Config, debug: bool) -> Result<Self> {
        let mut repository = Repository::from_config(&config.repository)?;
        repository.set_debug(debug);
        let applier = Applier::from_config(&config.applier, config.extract_path.as_deref())?;

        debug!(
            "Updater initialized: repository={}, applier={}, target={:?}",
            repository.kind(),
            applier.kind(),
            config.target_path
        );

        Ok(Self::new(
            repository,
            applier,
            config.download_dir.clone(),
            config.target_path.clone(),
        ))
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn applier(&self) -> &Applier {
        &self.applier
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Compare `current` with the latest published release
    pub async fn check(&self, current: Option<&str>) -> Result<CheckResult> {
        let latest = self.repository.get_latest_release().await?;
        info!("Latest version: {}", latest.version);

        let Some(current) = current else {
            return Ok(CheckResult::NoCurrentVersion { latest });
        };

        let current = current.to_string();
        if self.repository.compare_versions(&current, &latest.version)? {
            Ok(CheckResult::UpdateAvailable { current, latest })
        } else {
            Ok(CheckResult::UpToDate { current, latest })
        }
    }

    /// Download, verify, and apply the latest release when it is newer
    ///
    /// Without a current version the latest release is always applied.
    pub async fn update(&self, current: Option<&str>) -> Result<UpdateResult> {
        let release = self.repository.get_latest_release().await?;

        if let Some(current) = current {
            if !self.repository.compare_versions(current, &release.version)? {
                info!("Already up to date at {}", current);
                return Ok(UpdateResult::AlreadyUpToDate(release.version));
            }
        }

        info!("Starting update to version {}", release.version);

        let download = safe_join(&self.download_dir, &release.file_name)?;
        debug!("Computed download path: {:?}", download);

        self.repository.download(&release, &download).await?;
        info!("Downloaded to: {:?}", download);

        self.verify(&release, &download)?;

        info!("Applying update to {:?}", self.target_path);
        self.applier.apply(&download, &self.target_path)?;
        info!("Update applied: {}", release.version);

        Ok(UpdateResult::Updated {
            from: current.map(String::from),
            to: release.version,
            target: self.target_path.clone(),
            download,
        })
    }

    /// Provider verification policy
    ///
    /// The HTTP manifest variant already verified (and cleaned up) inside its
    /// download. GitHub downloads are checked here against the asset digest.
    fn verify(&self, release: &Release, download: &Path) -> Result<()> {
        if self.repository.kind() != RepositoryKind::GitHub {
            return Ok(());
        }

        let Some(expected) = &release.checksum else {
            warn!(
                "Release {} has no digest; skipping checksum verification",
                release.version
            );
            return Ok(());
        };

        if expected.algorithm != Algorithm::Sha256 {
            return discard_on_error(download, expected.verify(download));
        }

        if checksum::verify_sha256(download, &expected.digest)? {
            info!("Checksum verified");
            return Ok(());
        }

        let actual = checksum::calculate_sha256(download)?;
        discard_on_error(
            download,
            Err(UpdateError::Integrity {
                algorithm: expected.algorithm.to_string(),
                expected: expected.digest.to_ascii_lowercase(),
                actual,
            }),
        )
    }
}

fn discard_on_error(download: &Path, outcome: Result<()>) -> Result<()> {
    if outcome.is_err() {
        if let Err(e) = fs::remove_file(download) {
            warn!("Failed to remove rejected download {:?}: {}", download, e);
        }
    }
    outcome
}
