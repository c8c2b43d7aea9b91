//! Deterministic FIFO scheduler for tests and reference use.
//!
//! The lab scheduler provides:
//!
//! - A single logical stream of deferred callbacks (no threads, no
//!   wall-clock dependencies)
//! - FIFO execution of independently scheduled tasks
//! - Explicit driving: nothing runs until [`LabScheduler::step`] or
//!   [`LabScheduler::run_until_idle`] is called
//! - A selectable unhandled-rejection policy, so tests can assert on
//!   rejections that would otherwise be fatal
//!
//! Tasks scheduled while the lab is running are appended behind the tasks
//! already queued, which is exactly the ordering the settlement engine
//! assumes of a host.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Rejection;
use crate::scheduler::{Schedule, Task, TaskHandle};

/// What the lab does with an unhandled rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnhandledPolicy {
    /// Panic at the point of settlement (the default host behavior).
    Fatal,
    /// Record the rejection for later inspection.
    Capture,
}

/// Step budget for [`LabScheduler::run_until_idle`]; exceeding it means a
/// task is rescheduling itself without making progress.
const STEP_BUDGET: usize = 1 << 20;

struct QueuedTask {
    handle: TaskHandle,
    task: Task,
}

/// A deterministic, explicitly driven FIFO scheduler.
pub struct LabScheduler {
    queue: Mutex<VecDeque<QueuedTask>>,
    next_task: AtomicU64,
    policy: UnhandledPolicy,
    unhandled: Mutex<Vec<Rejection>>,
}

impl LabScheduler {
    /// Creates a lab with the fatal unhandled-rejection policy.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_policy(UnhandledPolicy::Fatal)
    }

    /// Creates a lab that records unhandled rejections instead of panicking.
    #[must_use]
    pub fn capturing() -> Arc<Self> {
        Self::with_policy(UnhandledPolicy::Capture)
    }

    /// Creates a lab with an explicit policy.
    #[must_use]
    pub fn with_policy(policy: UnhandledPolicy) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::new()),
            next_task: AtomicU64::new(0),
            policy,
            unhandled: Mutex::new(Vec::new()),
        })
    }

    /// Returns the number of queued tasks.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    /// Runs the next queued task, if any. Returns false when idle.
    pub fn step(&self) -> bool {
        let Some(queued) = self.queue.lock().pop_front() else {
            return false;
        };
        tracing::trace!(task = %queued.handle, "lab: running task");
        (queued.task)();
        true
    }

    /// Runs tasks FIFO until the queue drains; returns the number executed.
    ///
    /// # Panics
    ///
    /// Panics if the step budget is exceeded, which indicates a task that
    /// reschedules itself forever.
    pub fn run_until_idle(&self) -> usize {
        let mut steps = 0;
        while self.step() {
            steps += 1;
            assert!(steps < STEP_BUDGET, "lab scheduler failed to quiesce");
        }
        steps
    }

    /// Returns the unhandled rejections recorded under the capture policy.
    #[must_use]
    pub fn unhandled(&self) -> Vec<Rejection> {
        self.unhandled.lock().clone()
    }

    /// Takes the recorded unhandled rejections, clearing the log.
    #[must_use]
    pub fn take_unhandled(&self) -> Vec<Rejection> {
        std::mem::take(&mut self.unhandled.lock())
    }
}

impl Schedule for LabScheduler {
    fn schedule(&self, task: Task) -> TaskHandle {
        let handle = TaskHandle::new(self.next_task.fetch_add(1, Ordering::Relaxed));
        tracing::trace!(task = %handle, "lab: task scheduled");
        self.queue.lock().push_back(QueuedTask { handle, task });
        handle
    }

    fn unhandled_rejection(&self, rejection: Rejection) {
        match self.policy {
            UnhandledPolicy::Fatal => panic!("unhandled rejection in promise: {rejection}"),
            UnhandledPolicy::Capture => self.unhandled.lock().push(rejection),
        }
    }
}
