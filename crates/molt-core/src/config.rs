//! Configuration file loading, validation, and persistence
//!
//! The configuration is a single JSON document. Unknown keys are rejected at
//! parse time so that typos surface immediately instead of silently falling
//! back to defaults.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Configuration file name looked up next to the executable
pub const CONFIG_FILE_NAME: &str = "molt.json";

/// Recognized repository type tags
pub const REPOSITORY_TYPES: &[&str] = &["github", "http"];

/// Recognized applier type tags
pub const APPLIER_TYPES: &[&str] = &["binary", "archive"];

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where releases come from
    pub repository: RepositoryConfig,

    /// Version currently installed at `target_path`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,

    /// File (binary applier) or anchor path (archive applier) to update
    #[serde(default)]
    pub target_path: PathBuf,

    /// Applier type tag: "binary" or "archive"
    #[serde(default = "default_applier")]
    pub applier: String,

    /// Extraction root for the archive applier; defaults to the target's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_path: Option<PathBuf>,

    /// Directory downloads are written to before being applied
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

/// Repository section of the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Repository type tag: "github" or "http"
    #[serde(rename = "type", default = "default_repository_type")]
    pub kind: String,

    /// GitHub repository owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// GitHub repository name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// GitHub token for private repositories or higher rate limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Exact asset name to download instead of the first asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,

    /// Manifest URL for the HTTP repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn default_applier() -> String {
    "binary".to_string()
}

fn default_repository_type() -> String {
    "github".to_string()
}

fn default_download_dir() -> PathBuf {
    std::env::temp_dir().join("molt")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl RepositoryConfig {
    /// Owner, if set and non-empty
    pub fn owner(&self) -> Option<&str> {
        non_empty(&self.owner)
    }

    /// Repository name, if set and non-empty
    pub fn repo(&self) -> Option<&str> {
        non_empty(&self.repo)
    }

    /// Token, if set and non-empty
    pub fn token(&self) -> Option<&str> {
        non_empty(&self.token)
    }

    /// Asset name filter, if set and non-empty
    pub fn asset_name(&self) -> Option<&str> {
        non_empty(&self.asset_name)
    }

    /// Manifest URL, if set and non-empty
    pub fn url(&self) -> Option<&str> {
        non_empty(&self.url)
    }
}

impl Config {
    /// Load and validate configuration from `path`
    pub fn load(path: &Utf8Path) -> Result<Self> {
        debug!("Loading config from: {}", path);

        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check semantic constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let kind = self.repository.kind.as_str();
        if kind.is_empty() {
            return Err(Error::invalid_config("repository type is required"));
        }
        if !REPOSITORY_TYPES.contains(&kind) {
            return Err(Error::invalid_config(format!(
                "invalid repository type: {} (valid values: {})",
                kind,
                REPOSITORY_TYPES.join(", ")
            )));
        }

        match kind {
            "github" => {
                if self.repository.owner().is_none() {
                    return Err(Error::invalid_config(
                        "repository owner is required for GitHub",
                    ));
                }
                if self.repository.repo().is_none() {
                    return Err(Error::invalid_config("repository repo is required for GitHub"));
                }
            }
            "http" => {
                if self.repository.url().is_none() {
                    return Err(Error::invalid_config(
                        "repository url is required for HTTP repositories",
                    ));
                }
            }
            _ => {}
        }

        if self.target_path.as_os_str().is_empty() {
            return Err(Error::invalid_config("target_path is required"));
        }

        if self.applier.is_empty() {
            return Err(Error::invalid_config("applier is required"));
        }
        if !APPLIER_TYPES.contains(&self.applier.as_str()) {
            return Err(Error::invalid_config(format!(
                "invalid applier type: {} (valid values: {})",
                self.applier,
                APPLIER_TYPES.join(", ")
            )));
        }

        Ok(())
    }

    /// Current version, if set and non-empty
    pub fn current_version(&self) -> Option<&str> {
        non_empty(&self.current_version)
    }

    /// Write the configuration as pretty JSON, creating parent directories
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        fs::write(path, content)?;

        debug!("Saved config to: {}", path);
        Ok(())
    }

    /// Example configuration written by `molt init`
    pub fn template() -> Self {
        Self {
            repository: RepositoryConfig {
                kind: default_repository_type(),
                owner: Some("owner".to_string()),
                repo: Some("repo".to_string()),
                token: None,
                asset_name: None,
                url: None,
            },
            current_version: None,
            target_path: PathBuf::from("/path/to/target/binary"),
            applier: default_applier(),
            extract_path: None,
            download_dir: default_download_dir(),
        }
    }

    /// Write the template configuration, refusing to overwrite an existing file
    pub fn init(path: &Utf8Path) -> Result<Self> {
        if path.exists() {
            return Err(Error::config_exists(path.as_str()));
        }
        let config = Self::template();
        config.save(path)?;
        Ok(config)
    }
}

/// Default config location: `molt.json` next to the running executable
pub fn default_config_path() -> Utf8PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
        .and_then(|path| Utf8PathBuf::try_from(path).ok())
        .unwrap_or_else(|| Utf8PathBuf::from(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github_config() -> Config {
        serde_json::from_str(
            r#"{
                "repository": {"type": "github", "owner": "acme", "repo": "tool"},
                "target_path": "/usr/local/bin/tool"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = github_config();
        assert_eq!(config.applier, "binary");
        assert_eq!(config.download_dir, std::env::temp_dir().join("molt"));
        assert!(config.current_version().is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_repository_type_defaults_to_github() {
        let config: Config = serde_json::from_str(
            r#"{"repository": {"owner": "acme", "repo": "tool"}, "target_path": "/bin/tool"}"#,
        )
        .unwrap();
        assert_eq!(config.repository.kind, "github");
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let result: std::result::Result<Config, _> = serde_json::from_str(
            r#"{"repository": {"owner": "a", "repo": "b"}, "target_path": "/x", "bogus": 1}"#,
        );
        assert!(result.unwrap_err().to_string().contains("bogus"));
    }

    #[test]
    fn test_unknown_repository_key_rejected() {
        let result: std::result::Result<Config, _> = serde_json::from_str(
            r#"{"repository": {"owner": "a", "repo": "b", "branch": "main"}, "target_path": "/x"}"#,
        );
        assert!(result.unwrap_err().to_string().contains("branch"));
    }

    #[test]
    fn test_github_requires_owner_and_repo() {
        let mut config = github_config();
        config.repository.owner = Some(String::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("owner"));

        let mut config = github_config();
        config.repository.repo = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("repo"));
    }

    #[test]
    fn test_http_requires_url() {
        let mut config = github_config();
        config.repository.kind = "http".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("url"));

        config.repository.url = Some("https://example.com/releases.json".to_string());
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_types_rejected() {
        let mut config = github_config();
        config.repository.kind = "gitlab".to_string();
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("invalid repository type: gitlab"));

        let mut config = github_config();
        config.applier = "msi".to_string();
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("invalid applier type: msi"));
    }

    #[test]
    fn test_target_path_required() {
        let mut config = github_config();
        config.target_path = PathBuf::new();
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("target_path"));
    }

    #[test]
    fn test_template_is_valid() {
        Config::template().validate().unwrap();
    }

    #[test]
    fn test_empty_token_treated_as_unset() {
        let mut config = github_config();
        config.repository.token = Some("  ".to_string());
        assert!(config.repository.token().is_none());
    }
}
