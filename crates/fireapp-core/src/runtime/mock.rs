//! Scripted [`ProcessRunner`] for tests
//!
//! Responses are matched by program name and argument prefix, first match
//! wins. Commands with no matching response succeed with empty output.

use super::process::{ChildHandle, ProcessCommand, ProcessOutput, ProcessRunner};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Hook = Arc<dyn Fn(&ProcessCommand) + Send + Sync>;

#[derive(Clone)]
enum Outcome {
    Output(ProcessOutput),
    SpawnError(io::ErrorKind),
}

#[derive(Clone)]
struct Expectation {
    program: String,
    args_prefix: Vec<String>,
    outcome: Outcome,
    hook: Option<Hook>,
}

impl Expectation {
    fn matches(&self, command: &ProcessCommand) -> bool {
        self.program == command.program && command.args.starts_with(&self.args_prefix)
    }
}

#[derive(Default)]
struct State {
    expectations: Vec<Expectation>,
    history: Vec<ProcessCommand>,
    spawned: Vec<MockChild>,
}

#[derive(Clone, Default)]
pub struct MockProcessRunner {
    state: Arc<Mutex<State>>,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn expect(&self, program: &str, args_prefix: &[&str], outcome: Outcome, hook: Option<Hook>) {
        self.lock().expectations.push(Expectation {
            program: program.to_string(),
            args_prefix: args_prefix.iter().map(|a| a.to_string()).collect(),
            outcome,
            hook,
        });
    }

    /// Answer commands starting with `program args_prefix..` with `output`
    pub fn respond(&self, program: &str, args_prefix: &[&str], output: ProcessOutput) -> &Self {
        self.expect(program, args_prefix, Outcome::Output(output), None);
        self
    }

    /// Like [`respond`](Self::respond), and run `hook` before answering
    pub fn respond_with<F>(
        &self,
        program: &str,
        args_prefix: &[&str],
        output: ProcessOutput,
        hook: F,
    ) -> &Self
    where
        F: Fn(&ProcessCommand) + Send + Sync + 'static,
    {
        self.expect(program, args_prefix, Outcome::Output(output), Some(Arc::new(hook)));
        self
    }

    /// Make every invocation of `program` fail as if it were not installed
    pub fn not_found(&self, program: &str) -> &Self {
        self.spawn_error(program, io::ErrorKind::NotFound)
    }

    pub fn spawn_error(&self, program: &str, kind: io::ErrorKind) -> &Self {
        self.expect(program, &[], Outcome::SpawnError(kind), None);
        self
    }

    /// Every command run or spawned, in order
    pub fn history(&self) -> Vec<ProcessCommand> {
        self.lock().history.clone()
    }

    /// Argument vectors of every invocation of `program`
    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.lock()
            .history
            .iter()
            .filter(|cmd| cmd.program == program)
            .map(|cmd| cmd.args.clone())
            .collect()
    }

    /// Observers for every child started with `spawn`
    pub fn spawned(&self) -> Vec<MockChild> {
        self.lock().spawned.clone()
    }

    fn resolve(&self, command: &ProcessCommand) -> Result<ProcessOutput> {
        let matched = {
            let mut state = self.lock();
            state.history.push(command.clone());
            state
                .expectations
                .iter()
                .find(|e| e.matches(command))
                .cloned()
        };

        let Some(expectation) = matched else {
            return Ok(ProcessOutput::success(""));
        };
        if let Some(hook) = &expectation.hook {
            hook(command);
        }
        match expectation.outcome {
            Outcome::Output(output) => Ok(output),
            Outcome::SpawnError(kind) => Err(Error::Spawn {
                command: command.to_string(),
                source: io::Error::from(kind),
            }),
        }
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput> {
        self.resolve(command)
    }

    fn spawn(&self, command: &ProcessCommand) -> Result<Box<dyn ChildHandle>> {
        self.resolve(command)?;
        let child = MockChild {
            command: command.clone(),
            exited: Arc::new(AtomicBool::new(false)),
            terminated: Arc::new(AtomicBool::new(false)),
        };
        self.lock().spawned.push(child.clone());
        Ok(Box::new(child))
    }
}

/// A fake long-lived child; clones observe the same process
#[derive(Clone, Debug)]
pub struct MockChild {
    pub command: ProcessCommand,
    exited: Arc<AtomicBool>,
    terminated: Arc<AtomicBool>,
}

impl MockChild {
    /// Simulate the child exiting on its own
    pub fn finish(&self) {
        self.exited.store(true, Ordering::SeqCst);
    }

    pub fn was_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl ChildHandle for MockChild {
    fn id(&self) -> Option<u32> {
        None
    }

    fn has_exited(&mut self) -> io::Result<bool> {
        Ok(self.exited.load(Ordering::SeqCst))
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.terminated.store(true, Ordering::SeqCst);
        self.exited.store(true, Ordering::SeqCst);
        Ok(())
    }
}
