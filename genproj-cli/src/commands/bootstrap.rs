//! Command-line surface for genproj
//!
//! Fetches premake5 when it is missing, then generates project files:
//! - Check helper binaries (best effort)
//! - Download and unpack premake5 into `<home>/third_party/premake`
//! - Run `premake5 <action>` from the project root

use crate::bootstrap::{Bootstrapper, Reporter};
use crate::config::{BootstrapFile, CONFIG_FILE_NAME, Config};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "genproj",
    version,
    about = "Build script for Ashborn",
    long_about = "Build script for Ashborn.\n\nDownloads premake5 on first use and runs it to generate project files."
)]
pub struct BootstrapArgs {
    /// Premake action to execute [default: vs2022]
    #[arg(short, long)]
    pub action: Option<String>,

    /// Project root directory (default: parent of the genproj home directory)
    #[arg(short, long)]
    pub project_root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory holding build.log, bootstrap.toml and third_party/
    /// (default: directory of the genproj executable)
    #[arg(long, env = "GENPROJ_HOME")]
    pub home: Option<PathBuf>,

    /// Config file to read instead of <home>/bootstrap.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl BootstrapArgs {
    /// The bootstrapper's own directory
    pub fn resolve_home(&self) -> Result<PathBuf> {
        if let Some(home) = &self.home {
            return Ok(home.clone());
        }

        let exe = std::env::current_exe().context("Failed to determine current executable path")?;
        exe.parent()
            .map(Path::to_path_buf)
            .context("Failed to get parent directory of the executable")
    }

    /// Combine defaults, the config file and these arguments
    pub fn load_config(&self, home: &Path) -> Result<Config> {
        let file = match &self.config {
            Some(path) => BootstrapFile::load(path)?,
            None => BootstrapFile::load_or_default(&home.join(CONFIG_FILE_NAME))?,
        };

        Config::builder(home)
            .file(file)
            .project_root(self.project_root.clone())
            .action(self.action.clone())
            .verbose(self.verbose)
            .build()
    }
}

/// Run the whole workflow; `Ok(false)` means a step failed and was reported
pub async fn handle_bootstrap_command(config: Config, reporter: Reporter) -> Result<bool> {
    tracing::debug!(?config, "Resolved configuration");

    let bootstrapper = Bootstrapper::new(config, reporter)?;
    let action = bootstrapper.config().action().to_string();

    Ok(bootstrapper.run(&action).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags() {
        let args =
            BootstrapArgs::try_parse_from(["genproj", "-a", "gmake2", "-p", "/repo", "-v"]).unwrap();
        assert_eq!(args.action.as_deref(), Some("gmake2"));
        assert_eq!(args.project_root, Some(PathBuf::from("/repo")));
        assert!(args.verbose);

        let home = tempfile::tempdir().unwrap();
        assert!(args.load_config(home.path()).unwrap().verbose());
    }

    #[test]
    fn test_defaults_come_from_config() {
        let home = tempfile::tempdir().unwrap();
        let args = BootstrapArgs::try_parse_from(["genproj"]).unwrap();

        let config = args.load_config(home.path()).unwrap();
        assert_eq!(config.action(), "vs2022");
        assert_eq!(config.project_root(), home.path().parent().unwrap());
    }

    #[test]
    fn test_config_file_then_flags() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(
            home.path().join(CONFIG_FILE_NAME),
            "[bootstrap]\naction = \"gmake2\"\n",
        )
        .unwrap();

        let from_file = BootstrapArgs::try_parse_from(["genproj"]).unwrap();
        assert_eq!(from_file.load_config(home.path()).unwrap().action(), "gmake2");

        let from_flag = BootstrapArgs::try_parse_from(["genproj", "--action", "vs2019"]).unwrap();
        assert_eq!(from_flag.load_config(home.path()).unwrap().action(), "vs2019");
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let home = tempfile::tempdir().unwrap();
        let args = BootstrapArgs::try_parse_from([
            "genproj",
            "--config",
            home.path().join("missing.toml").to_str().unwrap(),
        ])
        .unwrap();
        assert!(args.load_config(home.path()).is_err());
    }

    #[test]
    fn test_explicit_home() {
        let args = BootstrapArgs::try_parse_from(["genproj", "--home", "/opt/ashborn/scripts"])
            .unwrap();
        assert_eq!(
            args.resolve_home().unwrap(),
            PathBuf::from("/opt/ashborn/scripts")
        );

        let config = args.load_config(&args.resolve_home().unwrap()).unwrap();
        assert_eq!(
            config.log_file(),
            Path::new("/opt/ashborn/scripts/build.log")
        );
    }
}
