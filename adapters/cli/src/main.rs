#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line entry point for the AURA analyzer.

use std::io;

use anyhow::Result;
use aura_cli::{execute, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Entry point for the AURA command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let _ = execute(&cli, io::stdout().lock())?;
    Ok(())
}
