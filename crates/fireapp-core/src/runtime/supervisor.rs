//! Registry of long-lived children
//!
//! Every child started with [`Supervisor::launch`] stays registered until it is
//! detached. Dropping a [`SupervisorGuard`] or calling
//! [`Supervisor::terminate_all`] signals every registered child that is still
//! running, so leaving the pipeline on any path never orphans a subprocess.

use super::process::{ChildHandle, ProcessCommand, ProcessRunner};
use crate::error::Result;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Identifies a child registered with a [`Supervisor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildId(u64);

struct Registered {
    id: ChildId,
    label: String,
    handle: Box<dyn ChildHandle>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    children: Vec<Registered>,
}

/// Shared handle to the child registry; clones refer to the same registry
#[derive(Clone, Default)]
pub struct Supervisor {
    inner: Arc<Mutex<Registry>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // A panic while holding the lock cannot leave the list half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Spawn `command` through `runner` and register the child
    pub fn launch(&self, runner: &dyn ProcessRunner, command: &ProcessCommand) -> Result<ChildId> {
        let handle = runner.spawn(command)?;
        Ok(self.register(command.to_string(), handle))
    }

    fn register(&self, label: impl Into<String>, handle: Box<dyn ChildHandle>) -> ChildId {
        let mut registry = self.lock();
        registry.next_id += 1;
        let id = ChildId(registry.next_id);
        let label = label.into();
        tracing::debug!(label = %label, pid = ?handle.id(), "registered child");
        registry.children.push(Registered { id, label, handle });
        id
    }

    /// Stop supervising a child without signalling it.
    /// Returns false if the id is unknown.
    pub fn detach(&self, id: ChildId) -> bool {
        let mut registry = self.lock();
        let before = registry.children.len();
        registry.children.retain(|child| child.id != id);
        registry.children.len() != before
    }

    /// Number of registered children that have not exited yet
    pub fn running(&self) -> usize {
        let mut registry = self.lock();
        registry
            .children
            .iter_mut()
            .map(|child| child.handle.has_exited().unwrap_or(true))
            .filter(|exited| !exited)
            .count()
    }

    /// Signal every registered child that is still running.
    /// Returns how many children were signalled.
    pub fn terminate_all(&self) -> usize {
        let mut registry = self.lock();
        let mut signalled = 0;
        for child in registry.children.iter_mut() {
            if child.handle.has_exited().unwrap_or(false) {
                continue;
            }
            match child.handle.terminate() {
                Ok(()) => {
                    tracing::debug!(label = %child.label, "terminated child");
                    signalled += 1;
                }
                Err(e) => tracing::warn!(label = %child.label, error = %e, "failed to terminate child"),
            }
        }
        registry.children.clear();
        signalled
    }

    /// Wait until every registered child has exited on its own
    pub async fn wait_all(&self, poll: Duration) {
        while self.running() > 0 {
            tokio::time::sleep(poll).await;
        }
    }

    /// Tie this registry's teardown to the returned guard's lifetime
    pub fn guard(&self) -> SupervisorGuard {
        SupervisorGuard(self.clone())
    }
}

/// Terminates every still-running child of its supervisor when dropped
pub struct SupervisorGuard(Supervisor);

impl Drop for SupervisorGuard {
    fn drop(&mut self) {
        let signalled = self.0.terminate_all();
        if signalled > 0 {
            tracing::info!("Stopped {} running subprocess(es)", signalled);
        }
    }
}
