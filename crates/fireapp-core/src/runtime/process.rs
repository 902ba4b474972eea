//! Subprocess invocation
//!
//! Every external tool (generator launcher, package manager, platform CLI) is
//! started through a [`ProcessRunner`]. Blocking runs are judged only by their
//! exit status; long-lived children are handed back as [`ChildHandle`]s.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// What a child process gets for one of its standard streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Inherit,
    Pipe,
    Ignore,
}

impl Stream {
    fn to_stdio(self) -> Stdio {
        match self {
            Stream::Inherit => Stdio::inherit(),
            Stream::Pipe => Stdio::piped(),
            Stream::Ignore => Stdio::null(),
        }
    }
}

/// Per-stream configuration for stdin, stdout and stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdioPolicy {
    pub stdin: Stream,
    pub stdout: Stream,
    pub stderr: Stream,
}

impl StdioPolicy {
    /// Output is shown on the terminal, no input is read
    pub const fn passthrough() -> Self {
        Self {
            stdin: Stream::Ignore,
            stdout: Stream::Inherit,
            stderr: Stream::Inherit,
        }
    }

    /// The child owns the terminal
    pub const fn interactive() -> Self {
        Self {
            stdin: Stream::Inherit,
            stdout: Stream::Inherit,
            stderr: Stream::Inherit,
        }
    }

    /// Output is collected for inspection instead of shown
    pub const fn captured() -> Self {
        Self {
            stdin: Stream::Ignore,
            stdout: Stream::Pipe,
            stderr: Stream::Pipe,
        }
    }
}

impl Default for StdioPolicy {
    fn default() -> Self {
        Self::passthrough()
    }
}

/// A program invocation: argument vector, working directory and stdio wiring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub stdio: StdioPolicy,
}

impl ProcessCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            stdio: StdioPolicy::default(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn stdio(mut self, stdio: StdioPolicy) -> Self {
        self.stdio = stdio;
        self
    }

    fn to_tokio(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args)
            .stdin(self.stdio.stdin.to_stdio())
            .stdout(self.stdio.stdout.to_stdio())
            .stderr(self.stdio.stderr.to_stdio());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn spawn_error(&self, source: io::Error) -> Error {
        Error::Spawn {
            command: self.to_string(),
            source,
        }
    }
}

impl fmt::Display for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a finished process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Code(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Code(0))
    }

    fn from_std(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitStatus::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitStatus::Signal(signal);
            }
        }
        ExitStatus::Code(-1)
    }
}

/// Result of a blocking run. Streams that were not piped are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: ExitStatus::Code(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: ExitStatus::Code(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn signalled(signal: i32) -> Self {
        Self {
            status: ExitStatus::Signal(signal),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Turn a non-zero exit or a signal termination into an error
    pub fn into_checked(self, command: &ProcessCommand) -> Result<Self> {
        match self.status {
            ExitStatus::Code(0) => Ok(self),
            ExitStatus::Code(code) => Err(Error::NonZeroExit {
                command: command.to_string(),
                code,
                stderr: self.stderr,
            }),
            ExitStatus::Signal(signal) => Err(Error::Signalled {
                command: command.to_string(),
                signal,
            }),
        }
    }
}

/// A child process that outlives the call that started it
pub trait ChildHandle: Send {
    /// OS process id, if still known
    fn id(&self) -> Option<u32>;

    /// Non-blocking check whether the child has exited
    fn has_exited(&mut self) -> io::Result<bool>;

    /// Ask the child to terminate without waiting for it
    fn terminate(&mut self) -> io::Result<()>;
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion. `Err` means the process could not be started at all.
    async fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput>;

    /// Start a long-lived child and return immediately
    fn spawn(&self, command: &ProcessCommand) -> Result<Box<dyn ChildHandle>>;

    /// Run to completion and fail on non-zero exit or signal termination
    async fn run_checked(&self, command: &ProcessCommand) -> Result<ProcessOutput> {
        tracing::debug!(command = %command, "running");
        self.run(command).await?.into_checked(command)
    }
}

/// Runner backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput> {
        let child = command
            .to_tokio()
            .spawn()
            .map_err(|e| command.spawn_error(e))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| command.spawn_error(e))?;

        Ok(ProcessOutput {
            status: ExitStatus::from_std(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn spawn(&self, command: &ProcessCommand) -> Result<Box<dyn ChildHandle>> {
        tracing::debug!(command = %command, "spawning");
        let child = command
            .to_tokio()
            .spawn()
            .map_err(|e| command.spawn_error(e))?;
        Ok(Box::new(TokioChild(child)))
    }
}

struct TokioChild(tokio::process::Child);

impl ChildHandle for TokioChild {
    fn id(&self) -> Option<u32> {
        self.0.id()
    }

    fn has_exited(&mut self) -> io::Result<bool> {
        Ok(self.0.try_wait()?.is_some())
    }

    fn terminate(&mut self) -> io::Result<()> {
        match self.0.start_kill() {
            // Already reaped
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            other => other,
        }
    }
}
