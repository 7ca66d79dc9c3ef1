//! immich-albums — turn a local folder tree into Immich albums.
//!
//! Every folder becomes one album named after it, holding the assets whose
//! original path on the Immich server matches the folder's files once a
//! configured path prefix is rewritten. The album id is remembered in a
//! `.album` marker inside the folder, so later runs append new files to the
//! same album instead of creating another one.

#![warn(clippy::all)]

mod cli;
mod config;
mod immich;
mod state;
mod sync;
mod types;

use std::ffi::OsStr;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use types::LogLevel;

const LOG_FILE_NAME: &str = "immich-albums.log";

/// A non-empty `DEBUG` environment value forces debug output.
fn debug_forced(value: Option<&OsStr>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Install the console logger and, with `log_dir`, a debug-level file
/// logger. The returned guard flushes the file writer when dropped and must
/// be held until the process exits.
fn init_logging(level: LogLevel, log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let level = if debug_forced(std::env::var_os("DEBUG").as_deref()) {
        LogLevel::Debug
    } else {
        level
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE_NAME));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(
                    EnvFilter::builder()
                        .with_default_directive(LevelFilter::WARN.into())
                        .parse_lossy(format!("{}=debug", env!("CARGO_CRATE_NAME"))),
                );
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(console_filter))
        .with(file_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let _log_guard = init_logging(cli.log_level, cli.log_dir.as_deref())?;

    let config = config::Config::load(cli)?;
    tracing::debug!(?config, "Configuration loaded");

    let client = immich::ImmichClient::new(&config.api_host, &config.api_key, config.timeout)
        .context("Failed to set up the Immich client")?;
    let store = state::MarkerFileStore::default();

    if config.sync.dry_run {
        tracing::info!("DRY RUN: no albums or markers will be changed");
    }

    let results = sync::sync_albums(&client, &store, &config.path, &config.sync).await;

    let summary = sync::SyncSummary::from_results(&results);
    summary.log(config.sync.dry_run);

    if summary.failed > 0 {
        for result in results.iter().filter(|r| r.is_failed()) {
            if let sync::FolderAction::Failed { error, transient } = &result.action {
                tracing::error!(
                    folder = %result.folder.display(),
                    transient,
                    "Folder failed: {}",
                    error
                );
            }
        }
        anyhow::bail!("{} of {} folders failed", summary.failed, summary.folders);
    }

    Ok(())
}
