//! Command-line surface parsed with `clap`.

use std::path::PathBuf;

use aura_core::{Screen, TestMode};
use clap::{Parser, Subcommand};

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "aura", version, about = "AURA gold purity analyzer simulator")]
pub struct Cli {
    /// Path of the JSON record store.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
    /// Master seed for deterministic runs.
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    /// TOML settings file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Sleep for every simulated tick instead of running as fast as possible.
    #[arg(long, global = true, default_value_t = false)]
    pub realtime: bool,
    /// Action to perform.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands understood by the analyzer.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run one complete purity test and store its result.
    Scan {
        /// Test mode; defaults to the settings file or jewelry.
        #[arg(long, value_parser = parse_mode)]
        mode: Option<TestMode>,
    },
    /// List stored test records.
    Records {
        /// Only list records produced in this mode.
        #[arg(long, value_parser = parse_mode)]
        mode: Option<TestMode>,
        /// List the oldest record first.
        #[arg(long, default_value_t = false)]
        oldest_first: bool,
    },
    /// Show aggregate statistics over the stored records.
    Stats,
    /// Export the stored records as CSV.
    Export {
        /// Destination file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the certificate of the newest stored result.
    Certificate,
    /// Show a screen by its identifier.
    Screen {
        /// Screen identifier such as `dashboard` or `about`.
        id: String,
    },
}

fn parse_mode(value: &str) -> Result<TestMode, String> {
    TestMode::parse(value).ok_or_else(|| {
        let known: Vec<&str> = TestMode::ALL.iter().map(|mode| mode.as_str()).collect();
        format!("unknown test mode `{value}`, expected one of {}", known.join(", "))
    })
}

/// Resolves a screen identifier, returning `None` for unknown identifiers.
#[must_use]
pub fn parse_screen(value: &str) -> Option<Screen> {
    Screen::parse(value.trim())
}
