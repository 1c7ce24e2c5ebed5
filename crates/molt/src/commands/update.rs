//! Update command

use anyhow::{Context, Result};
use camino::Utf8Path;
use molt_update::{UpdateResult, Updater};

use crate::commands::load_config;
use crate::output;

pub async fn run(config_path: &Utf8Path, debug: bool) -> Result<()> {
    let mut config = load_config(config_path)?;
    let updater = Updater::from_config(&config, debug)?;

    let spinner = output::spinner("Updating...");
    let result = updater.update(config.current_version()).await;
    spinner.finish_and_clear();

    match result.context("Update failed")? {
        UpdateResult::AlreadyUpToDate(latest) => {
            output::success(&format!("Already up to date ({})", latest));
        }
        UpdateResult::Updated {
            from,
            to,
            target,
            download,
        } => {
            output::kv("Downloaded to", &download.display().to_string());
            output::success(&format!(
                "Updated {} from {} to {}",
                target.display(),
                from.as_deref().unwrap_or("unknown"),
                to
            ));

            config.current_version = Some(to);
            if let Err(e) = config.save(config_path) {
                output::warning(&format!(
                    "Could not save updated version to config: {}",
                    e
                ));
            }
        }
    }

    Ok(())
}
