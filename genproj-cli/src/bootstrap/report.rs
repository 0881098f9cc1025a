//! Status lines for the user and the build log
//!
//! Every status transition is printed to stdout as a colored, symbol-prefixed
//! line and mirrored into the log under [`STATUS_TARGET`] with the symbol
//! swapped for a bracketed tag. The console log layer skips that target so
//! nothing is shown twice.

use crate::bootstrap::download::DownloadProgress;
use std::fmt::Display;
use std::io::{IsTerminal, Write};

/// tracing target for mirrored status lines
pub const STATUS_TARGET: &str = "genproj::status";

const RESET: &str = "\x1b[0m";
const BRIGHT: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Info,
    Success,
    Error,
}

impl Status {
    fn symbol(self) -> &'static str {
        match self {
            Self::Info => "ℹ️",
            Self::Success => "✅",
            Self::Error => "❌ ERROR:",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Info => "[INFO]",
            Self::Success => "[SUCCESS]",
            Self::Error => "[ERROR]",
        }
    }

    fn style(self) -> (&'static str, &'static str) {
        match self {
            Self::Info => ("", CYAN),
            Self::Success => (BRIGHT, GREEN),
            Self::Error => (BRIGHT, RED),
        }
    }
}

/// Console form of a status line
pub fn render_line(status: Status, message: &str, color: bool) -> String {
    let line = format!(" {} {}", status.symbol(), message);
    if color {
        let (style, fg) = status.style();
        format!("{style}{fg}{line}{RESET}")
    } else {
        line
    }
}

/// Log form of a status line
pub fn log_line(status: Status, message: &str) -> String {
    format!("{} {}", status.tag(), message.trim())
}

/// Prints status lines and mirrors them into the log
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    /// Colors only when stdout is a terminal
    pub fn new() -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn info(&self, message: impl Display) {
        self.emit(Status::Info, &message.to_string());
    }

    pub fn success(&self, message: impl Display) {
        self.emit(Status::Success, &message.to_string());
    }

    pub fn error(&self, message: impl Display) {
        self.emit(Status::Error, &message.to_string());
    }

    /// Echo captured process output under a heading
    pub fn block(&self, heading: &str, body: &str) {
        println!("{heading}");
        println!("{body}");
        tracing::info!(target: STATUS_TARGET, "{heading}\n{body}");
    }

    /// Echo captured process output without a heading
    pub fn output(&self, body: &str) {
        println!("{body}");
        tracing::info!(target: STATUS_TARGET, "{}", body.trim_end());
    }

    pub fn progress(&self, progress: &DownloadProgress) {
        if let Some(percent) = progress.percent {
            print!("\r 📥 Progress: {percent:.1}%");
            let _ = std::io::stdout().flush();
        }
    }

    pub fn finish_progress(&self, progress: &DownloadProgress) {
        if progress.percent.is_some() {
            println!();
        }
    }

    /// Boundary message for Ctrl-C
    pub fn canceled(&self) {
        self.boundary(YELLOW, "Build canceled");
        tracing::warn!(target: STATUS_TARGET, "Build canceled by user");
    }

    /// Boundary message for errors no step handled
    pub fn unexpected(&self, error: &anyhow::Error) {
        let message = format!("Unexpected error: {error:#}");
        self.boundary(RED, &message);
        tracing::error!(target: STATUS_TARGET, "{message}");
    }

    fn boundary(&self, fg: &str, message: &str) {
        if self.color {
            println!("\n{BRIGHT}{fg}{message}{RESET}");
        } else {
            println!("\n{message}");
        }
    }

    fn emit(&self, status: Status, message: &str) {
        println!("{}", render_line(status, message, self.color));
        let logged = log_line(status, message);
        match status {
            Status::Info | Status::Success => tracing::info!(target: STATUS_TARGET, "{logged}"),
            Status::Error => tracing::error!(target: STATUS_TARGET, "{logged}"),
        }
    }
}
