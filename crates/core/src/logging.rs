//! Structured logging with JSON output.
//!
//! Navigation decisions are reported through `tracing` macros throughout the
//! crate. This module installs the subscriber that writes them:
//! - JSON-structured logs written to a per-run file
//! - Level filtering from settings, overridable with `RUST_LOG`
//! - Removal of old run logs beyond the retention limit
//! - A unique run ID (UUID v7) naming the log file
//! - A session span stamping that run ID on every navigation record
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "info"
//! max-files = 3
//! directory = "logs"
//! ```
//!
//! ```bash
//! RUST_LOG=panelnav_core::navigation=debug,info ./panelnav
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use panelnav_core::settings::LoggingSettings;
//! use panelnav_core::logging::{init_logging, session_span, shutdown_logging, get_run_id};
//!
//! init_logging(&LoggingSettings::default())?;
//! eprintln!("Started with run ID: {}", get_run_id());
//!
//! session_span(4).in_scope(|| {
//!     tracing::info!("Application started");
//! });
//!
//! shutdown_logging();
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::settings::LoggingSettings;
use anyhow::{Context, Error};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::Duration;
use tracing::{info_span, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const LOG_FILE_PREFIX: &str = "panelnav-";
const LOG_FILE_SUFFIX: &str = "json";
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

static LOG_GUARD: OnceLock<Mutex<Option<WorkerGuard>>> = OnceLock::new();
static RUN_ID: OnceLock<String> = OnceLock::new();

/// Returns the unique run ID for this process.
///
/// Generated on first access, constant afterwards. The log file is named
/// `panelnav-<run_id>.json`.
pub fn get_run_id() -> &'static str {
    RUN_ID.get_or_init(|| Uuid::now_v7().to_string()).as_str()
}

/// Deletes the oldest run logs in `log_dir` until `keep` remain (0 keeps all).
///
/// Run IDs are UUID v7, so file name order is run order.
fn prune_run_logs(log_dir: &Path, keep: usize) -> Result<(), Error> {
    if keep == 0 {
        return Ok(());
    }

    let logs = run_logs(log_dir)?;
    let excess = logs.len().saturating_sub(keep);
    for path in &logs[..excess] {
        fs::remove_file(path)
            .with_context(|| format!("can't remove old run log {}", path.display()))?;
    }

    Ok(())
}

/// Run logs found in `log_dir`, oldest first.
fn run_logs(log_dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let dir = fs::read_dir(log_dir)
        .with_context(|| format!("can't read log directory {}", log_dir.display()))?;
    let mut logs = dir
        .map(|entry| entry.map(|entry| entry.path()))
        .filter(|path| path.as_ref().map_or(true, |path| is_run_log(path)))
        .collect::<Result<Vec<_>, _>>()
        .context("can't read log directory entry")?;
    logs.sort();
    Ok(logs)
}

/// `panelnav-<run_id>.json`, as written by [`init_logging`].
fn is_run_log(path: &Path) -> bool {
    let stem_matches = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.len() > LOG_FILE_PREFIX.len() && stem.starts_with(LOG_FILE_PREFIX));
    stem_matches && path.extension().is_some_and(|ext| ext == LOG_FILE_SUFFIX)
}

/// Root span for one navigation session.
///
/// Every record emitted while it is entered carries the run ID, the crate
/// version and the number of panels the session registered, so log lines
/// from different runs stay apart once collected.
pub fn session_span(panels: usize) -> Span {
    info_span!("session", run_id = get_run_id(), version = VERSION, panels)
}

/// Initializes the logging system.
///
/// Creates the log directory, prunes old run logs, then installs a JSON
/// formatting layer writing through a non-blocking appender. Call it once at
/// startup; it is a no-op when logging is disabled.
///
/// # Errors
///
/// Returns an error if the log directory cannot be prepared, the level
/// directive is invalid, or a global subscriber is already installed.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), Error> {
    if !settings.enabled {
        return Ok(());
    }

    let current_working_dir =
        std::env::current_dir().context("can't get current working directory")?;
    let log_dir = current_working_dir.join(&settings.directory);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("can't create log directory {}", &log_dir.display()))?;

    prune_run_logs(&log_dir, settings.max_files)?;

    let appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .filename_prefix(format!("{}{}", LOG_FILE_PREFIX, get_run_id()))
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(&log_dir)
        .context("can't initialize log file appender")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(Mutex::new(Some(guard)));

    let filter = build_filter(settings)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_current_span(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("can't initialize tracing subscriber")?;

    eprintln!(
        "Panelnav run started with ID: {} (version {})",
        get_run_id(),
        VERSION
    );

    Ok(())
}

/// Flushes buffered log records, waiting at most five seconds.
///
/// Safe to call when logging was never initialized, and more than once.
pub fn shutdown_logging() {
    let Some(slot) = LOG_GUARD.get() else {
        return;
    };
    let Some(guard) = slot.lock().ok().and_then(|mut slot| slot.take()) else {
        return;
    };

    // Dropping the guard blocks until the writer thread drains its queue.
    let (done_tx, done_rx) = mpsc::channel();
    thread::spawn(move || {
        drop(guard);
        let _ = done_tx.send(());
    });
    if done_rx.recv_timeout(SHUTDOWN_TIMEOUT).is_err() {
        eprintln!("Panelnav run {}: log flush timed out", get_run_id());
    }
}

/// `RUST_LOG` wins over the configured level; an empty level means `info`.
fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, Error> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let level = settings.level.trim();
    let level = if level.is_empty() { "info" } else { level };

    EnvFilter::builder()
        .parse(level)
        .context("invalid logging level")
}
