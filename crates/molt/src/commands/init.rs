//! Init command

use anyhow::{Context, Result};
use camino::Utf8Path;
use molt_core::Config;

use crate::output;

pub fn run(config_path: &Utf8Path) -> Result<()> {
    Config::init(config_path)
        .with_context(|| format!("Error creating config file at {}", config_path))?;

    output::success(&format!("Created template config file at: {}", config_path));

    output::header("Edit these fields");
    output::kv("repository.owner", "GitHub repository owner");
    output::kv("repository.repo", "GitHub repository name");
    output::kv("target_path", "Path where the binary should be installed");

    output::header("Optional fields");
    output::kv(
        "repository.type",
        "github (default) or http for a JSON release manifest",
    );
    output::kv("repository.url", "Manifest URL when type is http");
    output::kv(
        "repository.token",
        "GitHub token (private repos or higher rate limits)",
    );
    output::kv("repository.asset_name", "Exact release asset name to download");
    output::kv(
        "current_version",
        "Current version (updated automatically after each update)",
    );
    output::kv("applier", "binary (default) or archive");
    output::kv("extract_path", "Archive extraction directory");
    output::kv("download_dir", "Directory for downloads");

    Ok(())
}
