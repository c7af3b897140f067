//! Single-active-worker scheduling.

use super::executor::{Task, TaskExecutor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Holds the token that allows exactly one worker pass to run at a time.
pub(crate) struct Scheduler {
    active: AtomicBool,
    executor: Arc<dyn TaskExecutor>,
}

impl Scheduler {
    pub(crate) fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            active: AtomicBool::new(false),
            executor,
        }
    }

    /// Take the worker token. Returns `false` if a worker already holds it.
    pub(crate) fn try_acquire(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn release(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn execute(&self, task: Task) {
        self.executor.execute(task);
    }
}

/// Releases the worker token when dropped, including on unwind.
pub(crate) struct WorkerToken<'a> {
    scheduler: &'a Scheduler,
}

impl<'a> WorkerToken<'a> {
    /// Wrap a token already acquired through [`Scheduler::try_acquire`].
    pub(crate) fn held(scheduler: &'a Scheduler) -> Self {
        Self { scheduler }
    }
}

impl Drop for WorkerToken<'_> {
    fn drop(&mut self) {
        self.scheduler.release();
    }
}

/// Token travelling with a task handed to the executor.
///
/// An executor may drop a task without running it (failed thread spawn,
/// runtime shut down). The token is then released on drop so the next
/// submitted event can start a new worker.
pub(crate) struct PendingToken {
    scheduler: Option<Arc<Scheduler>>,
}

impl PendingToken {
    /// Wrap a token already acquired through [`Scheduler::try_acquire`].
    pub(crate) fn held(scheduler: Arc<Scheduler>) -> Self {
        Self {
            scheduler: Some(scheduler),
        }
    }

    /// Hand the token over to the code now running; it must release it.
    pub(crate) fn claim(mut self) {
        self.scheduler = None;
    }

    /// Give the token back without running a task.
    pub(crate) fn release(mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.release();
        }
    }
}

impl Drop for PendingToken {
    fn drop(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            tracing::warn!("worker task dropped before running; releasing worker token");
            scheduler.release();
        }
    }
}
