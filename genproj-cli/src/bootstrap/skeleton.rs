//! Tool directory skeleton
//!
//! Creates the third-party and premake directories the download step writes
//! into. Directories only; no files are created here.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of skeleton generation
#[derive(Debug, Default)]
pub struct SkeletonResult {
    pub created: Vec<PathBuf>,
    pub already_existed: Vec<PathBuf>,
}

/// Create a single directory, reporting whether it was new
fn create_directory(path: &Path) -> Result<bool> {
    if path.exists() {
        if path.is_dir() {
            Ok(false)
        } else {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        Ok(true)
    }
}

/// Create every directory in `dirs`, parents first
pub fn create_skeleton(dirs: &[&Path]) -> Result<SkeletonResult> {
    let mut result = SkeletonResult::default();

    for dir in dirs {
        if create_directory(dir)? {
            result.created.push(dir.to_path_buf());
        } else {
            result.already_existed.push(dir.to_path_buf());
        }
    }

    Ok(result)
}
