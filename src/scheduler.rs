//! The scheduler capability consumed by the settlement engine.
//!
//! The core never runs handlers inline. Every settlement-triggered handler
//! invocation, adoption step, and combinator completion is dispatched through
//! [`Schedule::schedule`], an external capability provided by the host. The
//! core receives a [`TaskHandle`] back and never inspects or cancels it.
//!
//! The one policy decision the host owns is what a terminal unhandled
//! rejection does: [`Schedule::unhandled_rejection`] defaults to a fatal
//! panic at the point of settlement, and a host may override it to log,
//! capture, or tear down however it sees fit.

use core::fmt;

use crate::error::Rejection;
use std::sync::Arc;

/// A deferred callback enqueued for isolated, later, exactly-once execution.
pub type Task = Box<dyn FnOnce() + Send>;

/// A shared handle to the host scheduler.
pub type SchedulerRef = Arc<dyn Schedule>;

/// An opaque identifier for a scheduled task.
///
/// Returned by [`Schedule::schedule`]; the settlement engine records the most
/// recent handle per promise for diagnostics but never reads it back.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

impl TaskHandle {
    /// Creates a handle from a host-assigned id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the host-assigned id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskHandle({})", self.0)
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// The external scheduling capability.
///
/// Implementations must guarantee that a scheduled task eventually runs,
/// exactly once, outside the call stack that scheduled it. Independently
/// scheduled tasks run FIFO under a single logical stream; the settlement
/// engine relies on nothing stronger.
pub trait Schedule: Send + Sync {
    /// Enqueues a callback for later, isolated execution.
    fn schedule(&self, task: Task) -> TaskHandle;

    /// Invoked when a rejected promise has no failure handler anywhere in
    /// its dependent chain.
    ///
    /// Runs synchronously at the point of settlement, which may be inside a
    /// producer callback or inside a scheduled propagation task. The default
    /// is fatal.
    fn unhandled_rejection(&self, rejection: Rejection) {
        panic!("unhandled rejection in promise: {rejection}");
    }
}
