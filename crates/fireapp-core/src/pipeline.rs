//! The scaffolding pipeline
//!
//! Stages run strictly in order and each one blocks until it is done, except
//! the last: `firebase init` is launched and left running under the
//! [`Supervisor`]. The first failing stage ends the run. Nothing is rolled
//! back; running again is safe because existing directories are kept and
//! existing files are only replaced on confirmation.

use crate::config::ScaffoldConfig;
use crate::error::Error;
use crate::prompt::Prompter;
use crate::runtime::packages::{self, InstallPlan};
use crate::runtime::process::{ProcessCommand, ProcessRunner};
use crate::runtime::supervisor::{ChildId, Supervisor};
use crate::runtime::tool::PlatformTool;
use crate::runtime::toolchain::{self, Toolchain};
use crate::runtime::version::InstallDecision;
use crate::session::Session;
use crate::templates::materializer::{self, CopyOutcome, DirOutcome};
use crate::templates::patch;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    SelectToolchain,
    Scaffold,
    ProbePlatform,
    Materialize,
    PatchManifest,
    InstallDeps,
    Login,
    LaunchInit,
    Done,
}

impl Stage {
    /// Every stage in execution order
    pub const ALL: [Stage; 9] = [
        Stage::SelectToolchain,
        Stage::Scaffold,
        Stage::ProbePlatform,
        Stage::Materialize,
        Stage::PatchManifest,
        Stage::InstallDeps,
        Stage::Login,
        Stage::LaunchInit,
        Stage::Done,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            Stage::SelectToolchain => "select toolchain",
            Stage::Scaffold => "scaffold project",
            Stage::ProbePlatform => "check platform CLI",
            Stage::Materialize => "create files",
            Stage::PatchManifest => "update package manifest",
            Stage::InstallDeps => "install dependencies",
            Stage::Login => "log in",
            Stage::LaunchInit => "start project setup",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A fatal failure, tagged with the stage it happened in
#[derive(Debug, thiserror::Error)]
#[error("Failed to {stage}: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl PipelineError {
    pub fn exit_code(&self) -> i32 {
        self.source.exit_code()
    }
}

fn at(stage: Stage) -> impl FnOnce(Error) -> PipelineError {
    move |source| {
        tracing::debug!(stage = ?stage, error = ?source, "stage failed");
        PipelineError { stage, source }
    }
}

/// What a completed run did
#[derive(Debug)]
pub struct PipelineReport {
    pub session: Session,
    pub project_root: PathBuf,
    pub platform: InstallDecision,
    pub directories: Vec<(String, DirOutcome)>,
    pub files: Vec<(String, CopyOutcome)>,
    pub installs: Vec<ProcessCommand>,
    pub init: ChildId,
    /// Stages in the order they completed
    pub stages: Vec<Stage>,
}

pub struct Pipeline<'a> {
    config: &'a ScaffoldConfig,
    runner: &'a dyn ProcessRunner,
    prompter: &'a dyn Prompter,
    supervisor: Supervisor,
    workspace: PathBuf,
    template_dir: PathBuf,
}

impl<'a> Pipeline<'a> {
    /// Pipeline working in the current directory with templates from `./template`
    pub fn new(
        config: &'a ScaffoldConfig,
        runner: &'a dyn ProcessRunner,
        prompter: &'a dyn Prompter,
        supervisor: Supervisor,
    ) -> Self {
        Self {
            config,
            runner,
            prompter,
            supervisor,
            workspace: PathBuf::from("."),
            template_dir: PathBuf::from(crate::DEFAULT_TEMPLATE_DIR),
        }
    }

    /// Directory the project is generated in
    pub fn workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = workspace.into();
        self
    }

    /// Directory the template files are copied from
    pub fn template_dir(mut self, template_dir: impl Into<PathBuf>) -> Self {
        self.template_dir = template_dir.into();
        self
    }

    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let mut stages = Vec::with_capacity(Stage::ALL.len());

        let stage = self.enter(Stage::SelectToolchain);
        let session = self.select_session().map_err(at(stage))?;
        let root = session.project_root(&self.workspace);
        stages.push(stage);

        let stage = self.enter(Stage::Scaffold);
        toolchain::scaffold(
            self.runner,
            &self.config.launcher,
            &session.toolchain,
            &session.app_name,
            &self.workspace,
        )
        .await
        .map_err(at(stage))?;
        stages.push(stage);

        let platform = PlatformTool::new(
            &self.config.platform,
            &self.config.package_manager,
            self.runner,
        );

        let stage = self.enter(Stage::ProbePlatform);
        let decision = platform
            .ensure_installed(&self.workspace)
            .await
            .map_err(at(stage))?;
        stages.push(stage);

        let stage = self.enter(Stage::Materialize);
        let (directories, files) = self.materialize(&root).await.map_err(at(stage))?;
        stages.push(stage);

        let stage = self.enter(Stage::PatchManifest);
        patch::patch_manifest(&self.config.manifest_path(&root), &self.config.manifest)
            .await
            .map_err(at(stage))?;
        stages.push(stage);

        let stage = self.enter(Stage::InstallDeps);
        let plan = InstallPlan::from_dependencies(&self.config.dependencies);
        let installs = packages::install(self.runner, &plan, &self.config.package_manager, &root)
            .await
            .map_err(at(stage))?;
        stages.push(stage);

        let stage = self.enter(Stage::Login);
        platform.login(&root).await.map_err(at(stage))?;
        stages.push(stage);

        let stage = self.enter(Stage::LaunchInit);
        let init = platform
            .launch_init(&root, &self.supervisor)
            .map_err(at(stage))?;
        stages.push(stage);

        stages.push(self.enter(Stage::Done));

        Ok(PipelineReport {
            session,
            project_root: root,
            platform: decision,
            directories,
            files,
            installs,
            init,
            stages,
        })
    }

    fn enter(&self, stage: Stage) -> Stage {
        tracing::debug!(stage = ?stage, "entering stage");
        stage
    }

    /// Ask for the toolchain and the app name
    fn select_session(&self) -> Result<Session, Error> {
        let toolchains = self.config.toolchains();
        let labels = toolchains.iter().map(|t| t.label.clone()).collect();
        let index = self
            .prompter
            .select("What toolchain do you want to use?", labels)?;
        let toolchain = select_toolchain(toolchains, index)?;
        tracing::debug!(toolchain = %toolchain, "toolchain selected");

        let app_name = self
            .prompter
            .input("Enter your app name", &self.config.default_app_name)?;
        Session::new(app_name, toolchain)
    }

    async fn materialize(
        &self,
        root: &Path,
    ) -> Result<(Vec<(String, DirOutcome)>, Vec<(String, CopyOutcome)>), Error> {
        tracing::info!("Creating files ......");
        let directories = materializer::create_directories(&self.config.directories, root).await?;
        let files =
            materializer::copy_files(&self.config.files, &self.template_dir, root, self.prompter)
                .await?;
        Ok((directories, files))
    }
}

fn select_toolchain(toolchains: Vec<Toolchain>, index: usize) -> Result<Toolchain, Error> {
    toolchains
        .into_iter()
        .nth(index)
        .ok_or_else(|| Error::UnexpectedAnswer(format!("toolchain #{}", index)))
}
