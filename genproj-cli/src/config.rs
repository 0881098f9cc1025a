//! Runtime configuration for genproj
//!
//! A [`Config`] is assembled once at startup from built-in defaults, the
//! optional `bootstrap.toml` next to the binary, and command-line overrides
//! (in increasing order of precedence). Nothing mutates it afterwards.

use crate::bootstrap::catalog::{Platform, ToolCatalog, ToolSource};
use crate::bootstrap::prereq::BinarySpec;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ACTION: &str = "vs2022";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const CONFIG_FILE_NAME: &str = "bootstrap.toml";
pub const LOG_FILE_NAME: &str = "build.log";
pub const THIRD_PARTY_DIR: &str = "third_party";
pub const PREMAKE_DIR: &str = "premake";

/// Contents of `bootstrap.toml`
#[derive(Debug, Default, Deserialize)]
pub struct BootstrapFile {
    #[serde(default)]
    pub bootstrap: BootstrapSection,
    #[serde(default)]
    pub generator: GeneratorSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct BootstrapSection {
    pub action: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub required_bins: BTreeMap<String, BinarySpec>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneratorSection {
    #[serde(default)]
    pub downloads: BTreeMap<Platform, ToolSource>,
}

impl BootstrapFile {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Like [`BootstrapFile::load`], but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Immutable settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    home_dir: PathBuf,
    project_root: PathBuf,
    third_party_dir: PathBuf,
    premake_dir: PathBuf,
    premake_exe: PathBuf,
    action: String,
    platform: Platform,
    timeout: Duration,
    required_bins: BTreeMap<String, BinarySpec>,
    catalog: ToolCatalog,
    log_file: PathBuf,
    verbose: bool,
}

impl Config {
    /// Start building a config rooted at the bootstrapper's home directory
    pub fn builder(home: impl Into<PathBuf>) -> ConfigBuilder {
        ConfigBuilder {
            home: home.into(),
            project_root: None,
            action: None,
            platform: None,
            timeout: None,
            catalog: None,
            file: BootstrapFile::default(),
            verbose: false,
        }
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn third_party_dir(&self) -> &Path {
        &self.third_party_dir
    }

    pub fn premake_dir(&self) -> &Path {
        &self.premake_dir
    }

    pub fn premake_exe(&self) -> &Path {
        &self.premake_exe
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn required_bins(&self) -> &BTreeMap<String, BinarySpec> {
        &self.required_bins
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Debug)]
pub struct ConfigBuilder {
    home: PathBuf,
    project_root: Option<PathBuf>,
    action: Option<String>,
    platform: Option<Platform>,
    timeout: Option<Duration>,
    catalog: Option<ToolCatalog>,
    file: BootstrapFile,
    verbose: bool,
}

impl ConfigBuilder {
    /// Settings read from `bootstrap.toml`; explicit builder calls win over them
    #[must_use]
    pub fn file(mut self, file: BootstrapFile) -> Self {
        self.file = file;
        self
    }

    #[must_use]
    pub fn project_root(mut self, root: Option<PathBuf>) -> Self {
        self.project_root = root;
        self
    }

    #[must_use]
    pub fn action(mut self, action: Option<String>) -> Self {
        self.action = action;
        self
    }

    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the built-in download table
    #[must_use]
    pub fn catalog(mut self, catalog: ToolCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Resolve every path to an absolute one and freeze the settings
    pub fn build(self) -> Result<Config> {
        let home_dir = std::path::absolute(&self.home)
            .with_context(|| format!("Failed to resolve {}", self.home.display()))?;

        let project_root = match self.project_root {
            Some(root) => std::path::absolute(&root)
                .with_context(|| format!("Failed to resolve {}", root.display()))?,
            None => home_dir.parent().unwrap_or(home_dir.as_path()).to_path_buf(),
        };

        let BootstrapFile {
            bootstrap,
            generator,
        } = self.file;

        let mut catalog = self.catalog.unwrap_or_else(ToolCatalog::builtin);
        for (platform, source) in generator.downloads {
            catalog.insert(platform, source);
        }

        let platform = self.platform.unwrap_or_else(Platform::current);
        let third_party_dir = home_dir.join(THIRD_PARTY_DIR);
        let premake_dir = third_party_dir.join(PREMAKE_DIR);
        let premake_exe = premake_dir.join(catalog.executable_for(&platform));

        let action = self
            .action
            .or(bootstrap.action)
            .unwrap_or_else(|| DEFAULT_ACTION.to_string());

        let timeout = self.timeout.unwrap_or_else(|| {
            Duration::from_secs(bootstrap.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
        });

        Ok(Config {
            log_file: home_dir.join(LOG_FILE_NAME),
            home_dir,
            project_root,
            third_party_dir,
            premake_dir,
            premake_exe,
            action,
            platform,
            timeout,
            required_bins: bootstrap.required_bins,
            catalog,
            verbose: self.verbose,
        })
    }
}
