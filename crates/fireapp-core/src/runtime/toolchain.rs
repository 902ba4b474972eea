//! Base project generation

use super::process::{ProcessCommand, ProcessRunner, StdioPolicy};
use crate::error::Result;
use std::fmt;
use std::path::Path;

/// A project generator the user can pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Name shown in the prompt
    pub label: String,
    /// Package handed to the launcher (e.g. `create-react-app`)
    pub token: String,
}

impl Toolchain {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }

    /// `<launcher> <token> <app_name>`, run from `workspace`
    pub fn command(&self, launcher: &str, app_name: &str, workspace: &Path) -> ProcessCommand {
        ProcessCommand::new(launcher)
            .arg(&self.token)
            .arg(app_name)
            .current_dir(workspace)
            .stdio(StdioPolicy::passthrough())
    }
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.token)
    }
}

/// Run the generator for `app_name` and wait for it to finish
pub async fn scaffold(
    runner: &dyn ProcessRunner,
    launcher: &str,
    toolchain: &Toolchain,
    app_name: &str,
    workspace: &Path,
) -> Result<()> {
    let command = toolchain.command(launcher, app_name, workspace);
    tracing::info!("Scaffolding {} with {} ......", app_name, toolchain.label);
    runner.run_checked(&command).await?;
    Ok(())
}
