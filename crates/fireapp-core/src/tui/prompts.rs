//! Charm-style CLI prompts using cliclack

use crate::config::ScaffoldConfig;
use crate::error::{Error, Result};
use crate::pipeline::{Pipeline, PipelineError, PipelineReport, Stage};
use crate::prompt::{Answer, Prompter, Question, QuestionKind};
use crate::runtime::process::TokioProcessRunner;
use crate::runtime::supervisor::Supervisor;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

/// How often to check whether `firebase init` has finished
const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Options for an interactive run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory the template files (and an optional scaffold.yaml) are read from
    pub template_dir: PathBuf,

    /// Directory the project is generated in
    pub workspace: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from(crate::DEFAULT_TEMPLATE_DIR),
            workspace: PathBuf::from("."),
        }
    }
}

/// Prompter backed by cliclack
#[derive(Debug, Clone, Copy, Default)]
pub struct CliclackPrompter;

impl Prompter for CliclackPrompter {
    fn ask(&self, question: &Question) -> Result<Answer> {
        match &question.kind {
            QuestionKind::Select(choices) => {
                let mut select = cliclack::select(question.message.as_str());
                for (idx, choice) in choices.iter().enumerate() {
                    select = select.item(idx, choice, "");
                }
                if let Some(Answer::Choice(initial)) = question.default {
                    select = select.initial_value(initial);
                }
                Ok(Answer::Choice(select.interact()?))
            }
            QuestionKind::Input => {
                let mut input = cliclack::input(question.message.as_str());
                if let Some(Answer::Text(default)) = &question.default {
                    input = input.placeholder(default).default_input(default);
                }
                let value: String = input.interact()?;
                Ok(Answer::Text(value.trim().to_string()))
            }
            QuestionKind::Confirm => {
                let initial = matches!(question.default, Some(Answer::Confirm(true)));
                let value: bool = cliclack::confirm(question.message.as_str())
                    .initial_value(initial)
                    .interact()?;
                Ok(Answer::Confirm(value))
            }
        }
    }
}

/// Run the whole pipeline interactively.
///
/// Returns once the project setup started in the last stage has exited.
/// Children still registered with `supervisor` when this returns early are
/// the caller's to terminate.
pub async fn run(
    options: RunOptions,
    supervisor: &Supervisor,
) -> std::result::Result<PipelineReport, PipelineError> {
    let setup_failed = |source: Error| PipelineError {
        stage: Stage::SelectToolchain,
        source,
    };
    let config = preflight(&options).map_err(setup_failed)?;
    cliclack::intro(format!("create-firebase-app {}", crate::VERSION).bold())
        .map_err(|e| setup_failed(e.into()))?;

    let runner = TokioProcessRunner;
    let prompter = CliclackPrompter;
    let report = Pipeline::new(&config, &runner, &prompter, supervisor.clone())
        .workspace(&options.workspace)
        .template_dir(&options.template_dir)
        .run()
        .await?;

    // The setup wizard owns the terminal until it exits
    supervisor.wait_all(CHILD_POLL_INTERVAL).await;

    println!();
    println!(
        "{} {}",
        "Project ready in".green().bold(),
        report.project_root.display()
    );
    println!(
        "  {} {}",
        "Next:".dimmed(),
        format!("cd {} && npm run dev", report.session.app_name).yellow()
    );
    cliclack::outro("Happy coding!").map_err(|e| setup_failed(e.into()))?;

    Ok(report)
}

/// Check the template directory and load the configuration before asking anything
fn preflight(options: &RunOptions) -> Result<ScaffoldConfig> {
    if !options.template_dir.is_dir() {
        return Err(Error::Config(format!(
            "Template directory not found: {}",
            options.template_dir.display()
        )));
    }
    ScaffoldConfig::load(&options.template_dir)
}
