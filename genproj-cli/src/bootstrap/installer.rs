//! Auto-installer for missing helper binaries
//!
//! Uses the explicit `install` command from `bootstrap.toml` when one is
//! given, otherwise the platform package manager. Installer stdout is
//! discarded; stderr is kept for the failure message.

use crate::bootstrap::catalog::Platform;
use crate::bootstrap::prereq::BinarySpec;
use crate::error::{InstallSnafu, Result};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Command line that would install `name` on `platform`
pub fn install_command(name: &str, spec: &BinarySpec, platform: &Platform) -> Option<Vec<String>> {
    if let Some(command) = spec.install.as_ref().filter(|argv| !argv.is_empty()) {
        return Some(command.clone());
    }

    let argv: &[&str] = match platform {
        Platform::Windows => &["winget", "install", "--silent", "--exact", "--id"],
        Platform::MacOs => &["brew", "install"],
        Platform::Linux => &["apt-get", "install", "-y"],
        Platform::Other(_) => return None,
    };

    let mut command: Vec<String> = argv.iter().map(ToString::to_string).collect();
    command.push(name.to_string());
    Some(command)
}

/// Install a single binary
pub async fn install_binary(name: &str, spec: &BinarySpec, platform: &Platform) -> Result<()> {
    let Some(argv) = install_command(name, spec, platform) else {
        return InstallSnafu {
            name,
            detail: format!("unsupported OS for auto-install: {platform}"),
        }
        .fail();
    };

    run_quiet(name, &argv).await
}

/// Run an installer with stdout suppressed, failing on a non-zero exit
async fn run_quiet(name: &str, argv: &[String]) -> Result<()> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        InstallSnafu {
            name,
            detail: "empty install command",
        }
        .build()
    })?;

    debug!("Running installer: {}", argv.join(" "));
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            return InstallSnafu {
                name,
                detail: format!("failed to execute {}: {e}", argv.join(" ")),
            }
            .fail();
        }
    };

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = if stderr.trim().is_empty() {
        format!("{} exited with {}", argv.join(" "), output.status)
    } else {
        stderr.trim().to_string()
    };
    InstallSnafu { name, detail }.fail()
}
