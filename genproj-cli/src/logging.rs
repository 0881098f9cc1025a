//! Log sinks for a genproj run
//!
//! [`init`] opens `build.log` in append mode and installs a subscriber with
//! two layers for as long as the returned [`LogHandle`] lives:
//! - the file layer records every event, without ANSI codes
//! - the console layer skips status lines, which the `Reporter` has
//!   already printed, and shows only warnings unless verbose
//!
//! `RUST_LOG` overrides the default level, except that status lines always
//! reach the file.

use crate::bootstrap::report::STATUS_TARGET;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::filter::{Directive, filter_fn};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Local wall-clock timestamps, e.g. `2026-10-18 14:03:07.412`
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Keeps the log subscriber installed; flushes the log file when dropped
#[must_use = "logging stops when the handle is dropped"]
pub struct LogHandle {
    path: PathBuf,
    file: Arc<File>,
    _guard: DefaultGuard,
}

impl std::fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogHandle").field("path", &self.path).finish()
    }
}

impl LogHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Push buffered log data to disk
    pub fn flush(&self) -> std::io::Result<()> {
        self.file.sync_all()
    }
}

impl Drop for LogHandle {
    fn drop(&mut self) {
        let _ = self.file.sync_all();
    }
}

/// Default filter directive for the given verbosity
pub fn default_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Whether an event is shown on stdout next to the `Reporter` output
pub fn shows_on_console(target: &str, level: Level, verbose: bool) -> bool {
    target != STATUS_TARGET && (verbose || level <= Level::WARN)
}

/// Level filter from `RUST_LOG`-style directives, keeping status lines at info
pub fn env_filter(directives: Option<&str>, verbose: bool) -> Result<EnvFilter> {
    let filter = directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level(verbose)));

    let status = format!("{STATUS_TARGET}=info")
        .parse::<Directive>()
        .context("Invalid status log directive")?;
    Ok(filter.add_directive(status))
}

/// Open `path` for appending and route this thread's events to it and stdout
pub fn init(path: &Path, verbose: bool) -> Result<LogHandle> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    install(path, env_filter(directives.as_deref(), verbose)?, verbose)
}

fn install(path: &Path, filter: EnvFilter, verbose: bool) -> Result<LogHandle> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let file = Arc::new(file);

    let file_layer = fmt::layer()
        .with_writer(Arc::clone(&file))
        .with_ansi(false)
        .with_timer(LocalTime);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(std::io::stdout().is_terminal())
        .with_timer(LocalTime)
        .with_filter(filter_fn(move |meta| {
            shows_on_console(meta.target(), *meta.level(), verbose)
        }));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer);

    let guard = tracing::subscriber::set_default(subscriber);

    Ok(LogHandle {
        path: path.to_path_buf(),
        file,
        _guard: guard,
    })
}
