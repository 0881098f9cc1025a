//! Failure taxonomy for the bootstrap workflow
//!
//! Every step of the workflow reports through [`BootstrapError`]; the
//! [`Bootstrapper`](crate::bootstrap::Bootstrapper) turns these into a logged
//! status line plus a boolean, so none of them escape to the program boundary.

use crate::bootstrap::catalog::Platform;
use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BootstrapError {
    #[snafu(display("Failed to install {name}: {detail}"))]
    Install { name: String, detail: String },

    #[snafu(display("Unsupported platform: {platform}"))]
    UnsupportedPlatform { platform: Platform },

    #[snafu(display("request to {url} failed: {source}"))]
    Request { url: String, source: reqwest::Error },

    #[snafu(display("failed to read response body from {url}: {source}"))]
    ResponseBody { url: String, source: reqwest::Error },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteArchive {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to open archive {}: {source}", path.display()))]
    OpenArchive {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to read zip archive {}: {source}", path.display()))]
    ReadZip {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[snafu(display("failed to extract {}: {source}", path.display()))]
    ExtractEntry {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to remove archive {}: {source}", path.display()))]
    RemoveArchive {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Premake executable not found after installation: {}", path.display()))]
    MissingExecutable { path: PathBuf },

    #[snafu(display("cannot enter project root {}: {source}", path.display()))]
    WorkingDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to launch {}: {source}", path.display()))]
    Launch {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Premake execution timed out after {secs} seconds"))]
    Timeout { secs: u64 },
}

pub type Result<T, E = BootstrapError> = std::result::Result<T, E>;
