//! Fireapp Core - scaffolding for React apps wired to Firebase
//!
//! The library drives a fixed pipeline: run a project generator, make sure the
//! platform CLI is installed, copy template files into the new project, patch
//! its package manifest, install dependencies, log in and hand the terminal to
//! the platform's interactive project setup.
//!
//! # Architecture
//!
//! - **Runtime** - subprocess invocation, child supervision, generator,
//!   package manager and platform CLI calls
//! - **Templates** - directory/file materialization and manifest patching
//! - **Pipeline** - stage ordering and fatal-error policy
//! - **TUI** - cliclack prompts and the interactive entry point (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompts and logging setup
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use fireapp_core::{Pipeline, ScaffoldConfig, ScriptedPrompter, Supervisor, TokioProcessRunner};
//!
//! let config = ScaffoldConfig::builtin()?;
//! let prompter = ScriptedPrompter::defaults();
//! let supervisor = Supervisor::new();
//! let _guard = supervisor.guard();
//! let report = Pipeline::new(&config, &TokioProcessRunner, &prompter, supervisor.clone())
//!     .run()
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod runtime;
pub mod session;
pub mod templates;

#[cfg(feature = "tui")]
pub mod logging;
#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{PlatformConfig, ScaffoldConfig};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineError, PipelineReport, Stage};
pub use prompt::{Answer, Prompter, Question, QuestionKind, ScriptedPrompter};
pub use runtime::{ProcessRunner, Supervisor, TokioProcessRunner};
pub use session::Session;

#[cfg(feature = "tui")]
pub use tui::run;

/// Library version, shown in the intro banner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Template location used when none is given, relative to the working directory
pub const DEFAULT_TEMPLATE_DIR: &str = "template";
