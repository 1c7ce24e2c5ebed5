//! Molt CLI - check for, download, and apply releases
//!
//! This is the main entry point for the molt command-line interface.

mod cli;
mod commands;
mod output;
mod version;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Must happen before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.debug, cli.quiet);

    let config_path = cli.config_path();

    match cli.command {
        Commands::Check => commands::check::run(&config_path, cli.debug).await,
        Commands::Update => commands::update::run(&config_path, cli.debug).await,
        Commands::Version(args) => commands::version::run(args),
        Commands::Init => commands::init::run(&config_path),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, debug: bool, quiet: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::new(filter_directive(verbose, debug, quiet)))
        .init();
}

fn filter_directive(verbose: u8, debug: bool, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match (verbose, debug) {
        (0, false) => "info",
        (0, true) | (1, _) => "debug",
        _ => "trace",
    }
}
