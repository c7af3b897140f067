//! Task execution facilities used to run worker passes.
//!
//! A worker pass is a synchronous unit of work: it drains the event queue,
//! retries deferred events and returns. Executors only decide where that
//! work runs.

use std::thread;
use tokio::runtime::Handle;

/// Unit of work handed to an executor.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs worker passes.
pub trait TaskExecutor: Send + Sync {
    fn execute(&self, task: Task);
}

/// Runs every task inline on the calling thread.
///
/// `send_event` and `start` then return only after the worker pass has
/// finished, which makes machine behavior fully deterministic. Events sent
/// from inside actions are still queued and drained by the same pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncTaskExecutor;

impl TaskExecutor for SyncTaskExecutor {
    fn execute(&self, task: Task) {
        task()
    }
}

/// Runs every task on a freshly spawned, named OS thread.
#[derive(Debug, Clone)]
pub struct ThreadTaskExecutor {
    name: String,
}

impl ThreadTaskExecutor {
    pub fn new() -> Self {
        Self::named("statework-worker")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ThreadTaskExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskExecutor for ThreadTaskExecutor {
    fn execute(&self, task: Task) {
        if let Err(err) = thread::Builder::new().name(self.name.clone()).spawn(task) {
            tracing::error!(error = %err, thread = %self.name, "failed to spawn worker thread");
        }
    }
}

/// Runs every task on the blocking pool of a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTaskExecutor {
    handle: Handle,
}

impl TokioTaskExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Executor bound to the runtime of the calling context.
    ///
    /// Returns `None` outside of a tokio runtime.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl TaskExecutor for TokioTaskExecutor {
    fn execute(&self, task: Task) {
        // Detached: completion is observed through the machine itself.
        drop(self.handle.spawn_blocking(task));
    }
}
