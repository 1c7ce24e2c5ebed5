//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Molt - check for, download, and apply releases
#[derive(Parser, Debug)]
#[command(name = "molt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable repository diagnostics (request URLs, asset and checksum selection)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to molt.json (default: next to the molt executable)
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Explicit `--config`, else the default location
    pub fn config_path(&self) -> Utf8PathBuf {
        self.config
            .clone()
            .unwrap_or_else(molt_core::default_config_path)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check for available updates
    Check,

    /// Download and apply the latest release
    Update,

    /// Show version information
    Version(VersionArgs),

    /// Create a template configuration file
    Init,
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
