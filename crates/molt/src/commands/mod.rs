//! CLI command implementations

pub mod check;
pub mod init;
pub mod update;
pub mod version;

use anyhow::{Context, Result};
use camino::Utf8Path;
use molt_core::Config;
use tracing::debug;

/// Load the config, pointing at `molt init` when that fails
pub(crate) fn load_config(path: &Utf8Path) -> Result<Config> {
    debug!("Loading config from: {}", path);
    Config::load(path).with_context(|| {
        format!(
            "Could not load config from {}\n\n\
             You can specify a config file location using the --config flag.\n\
             To create a template config file, run: molt init --config <path>",
            path
        )
    })
}
