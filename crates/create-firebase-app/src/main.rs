//! create-firebase-app - scaffold a React app wired to Firebase

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use fireapp_core::tui::RunOptions;
use fireapp_core::{PipelineError, Supervisor};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "create-firebase-app")]
#[command(about = "Scaffold a React app wired to Firebase")]
#[command(version)]
pub struct Args {
    /// Local directory to read template files from (for development use)
    #[arg(long = "template-dir", hide = true)]
    pub template_dir: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<Args> for RunOptions {
    fn from(args: Args) -> Self {
        let mut options = RunOptions::default();
        if let Some(dir) = args.template_dir {
            options.template_dir = dir;
        }
        options
    }
}

#[tokio::main]
async fn main() {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    let args = Args::parse();
    fireapp_core::logging::init(args.verbose);

    let supervisor = Supervisor::new();

    // Handle Ctrl+C: stop any running subprocess before exiting
    let on_interrupt = supervisor.clone();
    ctrlc::set_handler(move || {
        on_interrupt.terminate_all();
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let code = match run(args, &supervisor).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(stderr) = captured_stderr(&e) {
                eprintln!("{}", stderr.trim_end().dimmed());
            }
            exit_code(&e)
        }
    };

    // Nothing may outlive the process
    supervisor.terminate_all();
    let _ = console::Term::stderr().show_cursor();
    std::process::exit(code);
}

async fn run(args: Args, supervisor: &Supervisor) -> Result<()> {
    let _guard = supervisor.guard();
    fireapp_core::run(args.into(), supervisor).await?;
    Ok(())
}

/// Output a failed subprocess printed to a captured stderr
fn captured_stderr(err: &anyhow::Error) -> Option<&str> {
    let source = match err.downcast_ref::<PipelineError>() {
        Some(e) => &e.source,
        None => err.downcast_ref::<fireapp_core::Error>()?,
    };
    match source {
        fireapp_core::Error::NonZeroExit { stderr, .. } if !stderr.trim().is_empty() => {
            Some(stderr)
        }
        _ => None,
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<PipelineError>() {
        return e.exit_code();
    }
    if let Some(e) = err.downcast_ref::<fireapp_core::Error>() {
        return e.exit_code();
    }
    1
}
