//! Bootstrap workflow for Ashborn project generation
//!
//! - Helper binary checks and auto-installation
//! - premake5 acquisition (download, unzip, verify)
//! - Project file generation
//! - Status reporting to console and build log

pub mod catalog;
pub mod download;
pub mod extract;
pub mod generator;
pub mod installer;
pub mod prereq;
pub mod report;
pub mod skeleton;

pub use catalog::{Platform, ToolCatalog, ToolSource};
pub use generator::{GeneratorOutput, WorkingDirGuard};
pub use report::Reporter;

use crate::config::Config;
use crate::error::{
    BootstrapError, MissingExecutableSnafu, RemoveArchiveSnafu, Result, UnsupportedPlatformSnafu,
};
use download::{DownloadProgress, download_file};
use extract::extract_archive;
use generator::run_generator;
use installer::install_binary;
use prereq::{check_binary, check_prerequisites};
use skeleton::create_skeleton;
use snafu::{OptionExt, ResultExt, ensure};
use tracing::debug;

/// Drives the setup-and-generate workflow
///
/// Every step reports its own outcome and returns a plain `bool`; failures
/// are logged here and never propagated.
#[derive(Debug)]
pub struct Bootstrapper {
    config: Config,
    reporter: Reporter,
    http: reqwest::Client,
}

impl Bootstrapper {
    /// Create the tool directories and an HTTP client for `config`
    pub fn new(config: Config, reporter: Reporter) -> anyhow::Result<Self> {
        let skeleton = create_skeleton(&[config.third_party_dir(), config.premake_dir()])?;
        for dir in &skeleton.created {
            debug!("Created {}", dir.display());
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("genproj/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config,
            reporter,
            http,
        })
    }

    /// Use a caller-supplied HTTP client for downloads
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Make sure every declared helper binary is available, installing the
    /// missing ones. Returns true only if all of them end up usable.
    pub async fn validate_dependencies(&self) -> bool {
        let bins = self.config.required_bins();
        if bins.is_empty() {
            debug!("No helper binaries declared");
            return true;
        }

        let prereq = check_prerequisites(bins).await;
        let mut all_valid = true;

        for check in prereq.missing_required() {
            let Some(spec) = bins.get(&check.name) else {
                continue;
            };

            self.reporter
                .info(format!("Installing helper binary: {}", check.name));

            match install_binary(&check.name, spec, self.config.platform()).await {
                Ok(()) => {
                    if check_binary(&check.name, spec).await.is_satisfied() {
                        self.reporter.success(format!("{} installed", check.name));
                    } else {
                        self.reporter.error(format!(
                            "{} is still unavailable after installation",
                            check.name
                        ));
                        all_valid = false;
                    }
                }
                Err(e) => {
                    self.reporter.error(&e);
                    if let Some(hint) = &check.install_hint {
                        self.reporter.info(format!("Install {} manually: {hint}", check.name));
                    }
                    all_valid = false;
                }
            }
        }

        all_valid
    }

    /// Make sure the premake executable exists, downloading it if needed
    pub async fn ensure_generator_tool(&self) -> bool {
        if self.config.premake_exe().exists() {
            self.reporter.info("Premake found");
            return true;
        }

        match self.download_premake().await {
            Ok(()) => {
                self.reporter
                    .success("Premake downloaded and installed successfully");
                true
            }
            Err(e) => {
                self.reporter.error(describe(&e));
                false
            }
        }
    }

    async fn download_premake(&self) -> Result<()> {
        let platform = self.config.platform();
        let source = self
            .config
            .catalog()
            .lookup(platform)
            .context(UnsupportedPlatformSnafu {
                platform: platform.clone(),
            })?;

        let archive_path = self.config.third_party_dir().join(source.archive_name());
        let premake_exe = self.config.premake_exe();

        self.reporter.info("Premake5 not found. Downloading...");
        self.reporter
            .info(format!("Downloading Premake5 from {}", source.url));

        let mut last = DownloadProgress::new(0, None);
        let downloaded = download_file(&self.http, &source.url, &archive_path, |progress| {
            self.reporter.progress(progress);
            last = *progress;
        })
        .await;
        self.reporter.finish_progress(&last);
        downloaded?;

        extract_archive(&archive_path, self.config.premake_dir())?;

        std::fs::remove_file(&archive_path).context(RemoveArchiveSnafu {
            path: &archive_path,
        })?;

        #[cfg(unix)]
        mark_executable(premake_exe);

        ensure!(
            premake_exe.exists(),
            MissingExecutableSnafu { path: premake_exe }
        );
        Ok(())
    }

    /// Run premake with `action` inside the project root
    pub async fn generate_project_files(&self, action: &str) -> bool {
        self.reporter
            .info(format!("Generating project files with action: {action}"));

        let result = run_generator(
            self.config.premake_exe(),
            action,
            self.config.project_root(),
            self.config.timeout(),
        )
        .await;

        match result {
            Ok(output) if output.success() => {
                self.reporter.success("Project files generated successfully!");
                if !output.stdout.trim().is_empty() {
                    self.reporter.output(&output.stdout);
                }
                true
            }
            Ok(output) => {
                match output.code {
                    Some(code) => self
                        .reporter
                        .error(format!("Premake failed with return code {code}")),
                    None => self.reporter.error("Premake was terminated by a signal"),
                }
                self.reporter.block("=== Premake STDOUT ===", &output.stdout);
                self.reporter.block("=== Premake STDERR ===", &output.stderr);
                false
            }
            Err(e) => {
                self.reporter.error(describe(&e));
                false
            }
        }
    }

    /// Full workflow: helpers (best effort), premake, project files
    pub async fn run(&self, action: &str) -> bool {
        self.reporter.info("Starting project build process....");

        if !self.validate_dependencies().await {
            self.reporter.error("Failed to validate helper dependencies");
        }

        if !self.ensure_generator_tool().await {
            self.reporter.error("Failed to setup Premake5");
            return false;
        }

        if !self.generate_project_files(action).await {
            return false;
        }

        self.reporter.success("Build process completed!");
        true
    }
}

/// User-facing wording for a failed step
fn describe(error: &BootstrapError) -> String {
    match error {
        BootstrapError::Request { .. }
        | BootstrapError::ResponseBody { .. }
        | BootstrapError::WriteArchive { .. } => format!("Failed to download Premake5: {error}"),
        BootstrapError::OpenArchive { .. }
        | BootstrapError::ReadZip { .. }
        | BootstrapError::ExtractEntry { .. } => format!("Failed to extract archive: {error}"),
        BootstrapError::WorkingDirectory { .. } | BootstrapError::Launch { .. } => {
            format!("Failed to execute premake: {error}")
        }
        _ => error.to_string(),
    }
}

/// Zip archives built on Windows carry no usable mode bits
#[cfg(unix)]
fn mark_executable(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;

    if !path.is_file() {
        return;
    }
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)) {
        tracing::warn!("Failed to mark {} executable: {}", path.display(), e);
    }
}
