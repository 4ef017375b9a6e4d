#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the AURA analyzer simulation.

pub mod app;
pub mod cli;
pub mod config;

use std::{fs, io::Write, path::PathBuf};

use anyhow::{Context, Result as AnyResult};
use aura_core::{Command, Notice, NoticeLevel, Screen, TestMode, TestResult};
use aura_rendering::{render_stats, Presenter, WriterPresenter};
use aura_storage::{FileSlot, Order, RecordStore, Slot, SLOT_NAME};
use aura_system_export::{to_csv, EXPORT_FILE_NAME};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

pub use app::{App, Seeds};
pub use cli::{Cli, Commands};
pub use config::{ConfigError, Settings};

/// Executes the parsed command line, writing all output into `writer`.
///
/// The writer is handed back once the command completes.
pub fn execute<W: Write>(cli: &Cli, writer: W) -> AnyResult<W> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let store_path = cli
        .store
        .clone()
        .or_else(|| settings.store_path.clone())
        .unwrap_or_else(|| PathBuf::from(SLOT_NAME));
    let seed = cli.seed.or(settings.seed).unwrap_or_else(entropy_seed);
    info!(store = %store_path.display(), seed, "starting analyzer");

    let store = RecordStore::open(FileSlot::new(&store_path))
        .with_context(|| format!("failed to open record store {}", store_path.display()))?;
    let mut app = App::new(store, WriterPresenter::new(writer), seed);

    match &cli.command {
        Commands::Scan { mode } => {
            let mode = mode.or(settings.default_mode).unwrap_or_default();
            let _ = app.run_scan(mode, cli.realtime)?;
        }
        Commands::Records { mode, oldest_first } => {
            let order = if *oldest_first {
                Order::OldestFirst
            } else {
                Order::NewestFirst
            };
            app.submit(Command::ShowScreen {
                screen: Screen::Records,
            })?;
            let mut frame = app.frame();
            frame.records = list_records(app.store(), *mode, order);
            app.presenter_mut().present(&frame)?;
        }
        Commands::Stats => {
            let report = app.refresh_stats();
            app.presenter_mut().print(&render_stats(&report))?;
        }
        Commands::Export { out } => {
            let out = out.clone().unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            let records = app.store().records();
            fs::write(&out, to_csv(records))
                .with_context(|| format!("failed to write export {}", out.display()))?;
            info!(records = records.len(), path = %out.display(), "exported results");
            app.presenter_mut().notify(&Notice::new(
                NoticeLevel::Success,
                "Results exported successfully!",
            ))?;
        }
        Commands::Certificate => {
            app.submit(Command::GenerateCertificate)?;
            app.present()?;
        }
        Commands::Screen { id } => {
            match cli::parse_screen(id) {
                Some(screen) => app.submit(Command::ShowScreen { screen })?,
                None => warn!(screen = %id, "unknown screen ignored"),
            }
            app.present()?;
        }
    }

    Ok(app.into_presenter().into_inner())
}

fn list_records<S: Slot>(
    store: &RecordStore<S>,
    mode: Option<TestMode>,
    order: Order,
) -> Vec<TestResult> {
    match mode {
        Some(mode) => {
            let mut records = store.list_by_mode(mode);
            if order == Order::OldestFirst {
                records.reverse();
            }
            records
        }
        None => store.list(order),
    }
}

fn entropy_seed() -> u64 {
    ChaCha8Rng::from_entropy().next_u64()
}
