//! mbdsync - mirror a guardian's daycare memories to local disk.
//!
//! Logs in to the parent gateway (reusing a cached token when it is still
//! accepted), then downloads every photo and video posted over the last
//! few days that is not already on disk.

mod cli;

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mbdsync_core::{Config, SyncRunner};

use cli::Cli;

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr, and also to `log_file` when one is given. The returned
/// guard must be held until exit so buffered file output is flushed.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .context("--log-file must name a file")?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref())?;

    let config = Config::from_env(
        cli.download_dir.clone(),
        cli.cache_dir.clone(),
        cli.remember_downloads,
    )?;
    info!(
        days = cli.days,
        download_dir = %config.download_dir.display(),
        "mbdsync starting"
    );

    let today = chrono::Local::now().date_naive();
    let mut runner = SyncRunner::from_config(&config)?;
    let summary = runner.run(cli.days, today).await?;

    println!(
        "Handled {} attachments, downloaded {} new files into {}",
        summary.attachments_marked,
        summary.files_written,
        config.download_dir.display()
    );
    Ok(())
}
