//! Check command

use anyhow::Result;
use camino::Utf8Path;
use molt_update::{CheckResult, Updater};

use crate::commands::load_config;
use crate::output;

pub async fn run(config_path: &Utf8Path, debug: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let updater = Updater::from_config(&config, debug)?;

    let spinner = output::spinner("Checking for updates...");
    let result = updater.check(config.current_version()).await;
    spinner.finish_and_clear();
    let result = result?;

    output::kv("Latest version", &result.latest().version);

    match &result {
        CheckResult::NoCurrentVersion { .. } => {
            output::info("No current version set in config");
        }
        CheckResult::UpdateAvailable { current, latest } => {
            output::kv("Current version", current);
            output::success(&format!("New version available: {}", latest.version));
            output::kv("Download URL", &latest.download_url);
            if let Some(date) = latest.release_date {
                output::kv("Published", &date.format("%Y-%m-%d").to_string());
            }
            output::info("Run 'molt update' to install the update");
        }
        CheckResult::UpToDate { current, .. } => {
            output::kv("Current version", current);
            output::success("You are up to date");
        }
    }

    Ok(())
}
