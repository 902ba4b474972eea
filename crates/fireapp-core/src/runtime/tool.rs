//! Platform CLI management
//!
//! Probes, installs and drives the backend platform's command-line tool
//! (the Firebase CLI by default).

use super::process::{ProcessCommand, ProcessRunner, StdioPolicy};
use super::supervisor::{ChildId, Supervisor};
use super::version::{self, InstallDecision, Probe};
use crate::config::PlatformConfig;
use crate::error::Result;
use std::path::Path;

/// Manager for the platform CLI
pub struct PlatformTool<'a> {
    config: &'a PlatformConfig,
    package_manager: &'a str,
    runner: &'a dyn ProcessRunner,
}

impl<'a> PlatformTool<'a> {
    pub fn new(
        config: &'a PlatformConfig,
        package_manager: &'a str,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        Self {
            config,
            package_manager,
            runner,
        }
    }

    pub fn version_command(&self, cwd: &Path) -> ProcessCommand {
        ProcessCommand::new(&self.config.binary)
            .arg(&self.config.version_flag)
            .current_dir(cwd)
            .stdio(StdioPolicy::captured())
    }

    pub fn install_command(&self, cwd: &Path) -> ProcessCommand {
        ProcessCommand::new(self.package_manager)
            .args(["install", "-g"])
            .arg(&self.config.package)
            .current_dir(cwd)
            .stdio(StdioPolicy::passthrough())
    }

    pub fn login_command(&self, project_root: &Path) -> ProcessCommand {
        ProcessCommand::new(&self.config.binary)
            .args(self.config.login_args.iter().cloned())
            .current_dir(project_root)
            .stdio(StdioPolicy::interactive())
    }

    pub fn init_command(&self, project_root: &Path) -> ProcessCommand {
        ProcessCommand::new(&self.config.binary)
            .args(self.config.init_args.iter().cloned())
            .current_dir(project_root)
            .stdio(StdioPolicy::interactive())
    }

    /// Run the version flag with output captured.
    ///
    /// A binary that is not on PATH is reported as [`Probe::Missing`]; any
    /// other failure to run it is an error.
    pub async fn probe(&self, cwd: &Path) -> Result<Probe> {
        tracing::info!("Checking {} version ......", self.config.display_name);
        let command = self.version_command(cwd);

        match self.runner.run_checked(&command).await {
            Ok(output) => Ok(Probe::Reported {
                stdout: output.stdout,
                stderr: output.stderr,
            }),
            Err(e) if e.is_not_found() => {
                tracing::info!("{} is not installed", self.config.binary);
                Ok(Probe::Missing)
            }
            Err(e) => Err(e),
        }
    }

    /// Probe the installed version and install the CLI unless it is recent enough
    pub async fn ensure_installed(&self, cwd: &Path) -> Result<InstallDecision> {
        let probe = self.probe(cwd).await?;
        let decision = version::decide(&probe, self.config.minimum_major);

        match &decision {
            InstallDecision::Skip { version } => {
                tracing::info!(
                    "Skipping download of {} CLI (Version {} already present)",
                    self.config.display_name,
                    version
                );
            }
            InstallDecision::Install { reason } => {
                tracing::info!("{} CLI {}", self.config.display_name, reason);
                self.install(cwd).await?;
            }
        }

        Ok(decision)
    }

    /// Install the CLI globally through the package manager
    pub async fn install(&self, cwd: &Path) -> Result<()> {
        tracing::info!("Installing {} CLI ......", self.config.display_name);
        self.runner.run_checked(&self.install_command(cwd)).await?;
        tracing::info!("{} CLI installed successfully!", self.config.display_name);
        Ok(())
    }

    /// Interactive authentication; the user answers the CLI directly
    pub async fn login(&self, project_root: &Path) -> Result<()> {
        tracing::info!("Logging into {} ......", self.config.display_name);
        self.runner
            .run_checked(&self.login_command(project_root))
            .await?;
        tracing::info!("{} login successful!", self.config.display_name);
        Ok(())
    }

    /// Start the interactive project initialization and return without waiting
    pub fn launch_init(&self, project_root: &Path, supervisor: &Supervisor) -> Result<ChildId> {
        tracing::info!("Starting {} project setup ......", self.config.display_name);
        supervisor.launch(self.runner, &self.init_command(project_root))
    }
}
