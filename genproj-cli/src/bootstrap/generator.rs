//! premake5 invocation
//!
//! The generator runs as `<executable> <action>` from inside the project
//! root. The process working directory is switched for the duration of the
//! call and switched back by [`WorkingDirGuard`] on every exit path,
//! including timeouts, cancellation and unwinding.

use crate::error::{LaunchSnafu, Result, TimeoutSnafu, WorkingDirectorySnafu};
use snafu::ResultExt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured result of one generator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOutput {
    /// `None` when the process was ended by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GeneratorOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Switches the process working directory and restores it on drop
#[derive(Debug)]
pub struct WorkingDirGuard {
    original: PathBuf,
}

impl WorkingDirGuard {
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let original = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        debug!("Entered {} (was {})", dir.display(), original.display());
        Ok(Self { original })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.original) {
            warn!(
                "Failed to restore working directory {}: {}",
                self.original.display(),
                e
            );
        }
    }
}

/// Run `executable action` in `project_root`, waiting at most `timeout`
///
/// A non-zero exit is not an error here; inspect [`GeneratorOutput::code`].
/// On timeout the child is killed.
pub async fn run_generator(
    executable: &Path,
    action: &str,
    project_root: &Path,
    timeout: Duration,
) -> Result<GeneratorOutput> {
    let _cwd = WorkingDirGuard::enter(project_root).context(WorkingDirectorySnafu {
        path: project_root,
    })?;

    let child = Command::new(executable)
        .arg(action)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .context(LaunchSnafu { path: executable })?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            TimeoutSnafu {
                secs: timeout.as_secs(),
            }
            .build()
        })?
        .context(LaunchSnafu { path: executable })?;

    Ok(GeneratorOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_means_zero() {
        let mut output = GeneratorOutput {
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(output.success());

        output.code = Some(1);
        assert!(!output.success());

        output.code = None;
        assert!(!output.success());
    }
}
