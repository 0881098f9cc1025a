//! Helper binary checks
//!
//! Validates that the helper binaries declared under
//! `[bootstrap.required_bins]` are on `PATH`, with a satisfying version when
//! one is requested.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::warn;

/// One entry of `[bootstrap.required_bins]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BinarySpec {
    /// Semver requirement, e.g. ">=2.30.0"; a bare version means an exact match
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub priority: u8,
    /// Explicit install command; the platform package manager is used otherwise
    #[serde(default)]
    pub install: Option<Vec<String>>,
    #[serde(default)]
    pub install_hint: Option<String>,
}

/// Result of checking a single binary
#[derive(Debug, Clone)]
pub struct BinaryCheck {
    pub name: String,
    pub found: bool,
    pub installed_version: Option<String>,
    pub required_version: Option<String>,
    pub meets_requirement: bool,
    pub path: Option<PathBuf>,
    pub install_hint: Option<String>,
}

impl BinaryCheck {
    fn unavailable(name: &str, spec: &BinarySpec) -> Self {
        Self {
            name: name.to_string(),
            found: false,
            installed_version: None,
            required_version: spec.version.clone(),
            meets_requirement: false,
            path: None,
            install_hint: spec.install_hint.clone(),
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.found && self.meets_requirement
    }
}

/// Overall prerequisite check result
#[derive(Debug)]
pub struct PrereqResult {
    pub required: Vec<BinaryCheck>,
    pub all_required_met: bool,
}

impl PrereqResult {
    /// Binaries that are absent or too old
    pub fn missing_required(&self) -> Vec<&BinaryCheck> {
        self.required.iter().filter(|b| !b.is_satisfied()).collect()
    }
}

/// Get version of binary by running `<binary> --version`
fn get_version(path: &Path) -> Option<String> {
    let output = Command::new(path).arg("--version").output().ok()?;

    if !output.status.success() {
        return None;
    }

    let version_output = String::from_utf8(output.stdout).ok()?;
    extract_version(&version_output)
}

/// Extract semantic version from version output
/// Handles various formats:
///   "git version 2.34.1" -> "2.34.1"
///   "cmake version 3.28.3" -> "3.28.3"
///   "ninja 1.11.1" -> "1.11.1"
fn extract_version(output: &str) -> Option<String> {
    let re = regex::Regex::new(r"v?(\d+\.\d+\.\d+)").ok()?;
    re.captures(output)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check if installed version meets a requirement such as ">=1.0.0"
fn version_meets_requirement(installed: &str, requirement: &str) -> Result<bool> {
    let requirement = requirement.trim();
    let requirement = if requirement.starts_with(|c: char| c.is_ascii_digit()) {
        format!("={requirement}")
    } else {
        requirement.to_string()
    };

    let installed_ver = semver::Version::parse(installed.trim())
        .with_context(|| format!("Failed to parse installed version: {installed}"))?;

    let required = semver::VersionReq::parse(&requirement)
        .with_context(|| format!("Failed to parse required version: {requirement}"))?;

    Ok(required.matches(&installed_ver))
}

/// Check a single binary against its declared requirement
///
/// The PATH lookup and `--version` probe block, so they run on the blocking
/// pool.
pub async fn check_binary(name: &str, spec: &BinarySpec) -> BinaryCheck {
    let (owned_name, owned_spec) = (name.to_string(), spec.clone());
    match tokio::task::spawn_blocking(move || probe_binary(&owned_name, &owned_spec)).await {
        Ok(check) => check,
        Err(e) => {
            warn!("Check for {} did not complete: {}", name, e);
            BinaryCheck::unavailable(name, spec)
        }
    }
}

fn probe_binary(name: &str, spec: &BinarySpec) -> BinaryCheck {
    let path = which::which(name).ok();
    let found = path.is_some();

    let (installed_version, meets_requirement) = match (&path, &spec.version) {
        (None, _) => (None, false),
        (Some(_), None) => (None, true),
        (Some(path), Some(requirement)) => match get_version(path) {
            Some(version) => {
                let meets = version_meets_requirement(&version, requirement).unwrap_or(false);
                (Some(version), meets)
            }
            // Binary found but version unknown - assume OK
            None => (Some("unknown".to_string()), true),
        },
    };

    BinaryCheck {
        name: name.to_string(),
        found,
        installed_version,
        required_version: spec.version.clone(),
        meets_requirement,
        path,
        install_hint: spec.install_hint.clone(),
    }
}

/// Check every declared helper binary, highest priority (lowest number) first
pub async fn check_prerequisites(bins: &BTreeMap<String, BinarySpec>) -> PrereqResult {
    let mut required: Vec<(u8, BinaryCheck)> = Vec::with_capacity(bins.len());
    for (name, spec) in bins {
        required.push((spec.priority, check_binary(name, spec).await));
    }

    required.sort_by_key(|(priority, _)| *priority);
    let required: Vec<BinaryCheck> = required.into_iter().map(|(_, check)| check).collect();
    let all_required_met = required.iter().all(BinaryCheck::is_satisfied);

    PrereqResult {
        required,
        all_required_met,
    }
}
