//! Dependency installation through the package manager

use super::process::{ProcessCommand, ProcessRunner, StdioPolicy};
use crate::error::Result;
use indexmap::IndexMap;
use std::path::Path;

/// Packages split by installation mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    pub runtime: Vec<String>,
    pub dev: Vec<String>,
}

impl InstallPlan {
    /// Split a package -> is-dev mapping; each package lands in exactly one list
    pub fn from_dependencies(dependencies: &IndexMap<String, bool>) -> Self {
        let (dev, runtime): (Vec<_>, Vec<_>) = dependencies.iter().partition(|&(_, &dev)| dev);
        Self {
            runtime: runtime.into_iter().map(|(name, _)| name.clone()).collect(),
            dev: dev.into_iter().map(|(name, _)| name.clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runtime.is_empty() && self.dev.is_empty()
    }

    /// One install command per non-empty partition, runtime first
    pub fn commands(&self, package_manager: &str, project_root: &Path) -> Vec<ProcessCommand> {
        [("--save", &self.runtime), ("--save-dev", &self.dev)]
            .into_iter()
            .filter(|(_, packages)| !packages.is_empty())
            .map(|(mode, packages)| {
                ProcessCommand::new(package_manager)
                    .args(["install", mode])
                    .args(packages.iter().cloned())
                    .current_dir(project_root)
                    .stdio(StdioPolicy::passthrough())
            })
            .collect()
    }
}

/// Run the plan's install commands in order, stopping at the first failure
pub async fn install(
    runner: &dyn ProcessRunner,
    plan: &InstallPlan,
    package_manager: &str,
    project_root: &Path,
) -> Result<Vec<ProcessCommand>> {
    if plan.is_empty() {
        tracing::info!("No dependencies to install");
        return Ok(Vec::new());
    }

    let commands = plan.commands(package_manager, project_root);

    tracing::info!("Installing dependencies ......");
    for command in &commands {
        runner.run_checked(command).await?;
        tracing::info!(
            "Dependencies {} successfully installed",
            command.args[2..].join(", ")
        );
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::runtime::mock::MockProcessRunner;
    use crate::runtime::process::ProcessOutput;

    fn deps(entries: &[(&str, bool)]) -> IndexMap<String, bool> {
        entries
            .iter()
            .map(|(name, dev)| (name.to_string(), *dev))
            .collect()
    }

    #[test]
    fn test_partition_is_exact() {
        let set = deps(&[
            ("cross-env", true),
            ("firebase", false),
            ("react-router-dom", false),
            ("prettier", true),
        ]);
        let plan = InstallPlan::from_dependencies(&set);

        assert_eq!(plan.runtime, vec!["firebase", "react-router-dom"]);
        assert_eq!(plan.dev, vec!["cross-env", "prettier"]);

        let commands = plan.commands("npm", Path::new("demo-app"));
        let mut seen: Vec<&String> = commands.iter().flat_map(|c| &c.args[2..]).collect();
        seen.sort();
        let mut expected: Vec<&String> = set.keys().collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_install_modes() {
        let plan = InstallPlan::from_dependencies(&deps(&[("cross-env", true), ("firebase", false)]));
        let commands = plan.commands("npm", Path::new("demo-app"));

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].args, vec!["install", "--save", "firebase"]);
        assert_eq!(commands[1].args, vec!["install", "--save-dev", "cross-env"]);
        assert!(commands
            .iter()
            .all(|c| c.working_dir.as_deref() == Some(Path::new("demo-app"))));
    }

    #[test]
    fn test_empty_partition_is_skipped() {
        let plan = InstallPlan::from_dependencies(&deps(&[("firebase", false)]));
        let commands = plan.commands("npm", Path::new("."));
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].args[1], "--save");
    }

    #[tokio::test]
    async fn test_empty_set_runs_nothing() {
        let runner = MockProcessRunner::new();
        let plan = InstallPlan::from_dependencies(&IndexMap::new());
        assert!(plan.is_empty());

        let ran = install(&runner, &plan, "npm", Path::new(".")).await.unwrap();
        assert!(ran.is_empty());
        assert!(runner.history().is_empty());
    }

    #[tokio::test]
    async fn test_failure_stops_installation() {
        let runner = MockProcessRunner::new();
        runner.respond("npm", &["install", "--save"], ProcessOutput::failure(1, "E404"));
        let plan = InstallPlan::from_dependencies(&deps(&[("cross-env", true), ("firebase", false)]));

        let err = install(&runner, &plan, "npm", Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NonZeroExit { .. }));
        assert_eq!(runner.calls_to("npm").len(), 1);
    }
}
