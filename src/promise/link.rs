//! Dependent links: what a settling promise fans out to.
//!
//! Three link shapes hang off a pending promise:
//!
//! - [`ChainLink`]: produced by `then`-style composition; optional handlers
//!   plus the downstream promise created at registration time
//! - [`AdoptLink`]: registered on a pending inner promise during adoption;
//!   forwards both outcomes unchanged into the adopting promise
//! - [`WatchLink`]: an internal observer used by the collective combinators
//!
//! The settling promise decides *which* links to schedule (success fan-out
//! skips links without a success handler; rejection fan-out starves
//! success-only links whenever any failure handler exists). The link decides
//! what its scheduled task does with the outcome.

use crate::error::Rejection;
use crate::promise::state::{Completion, Resolution};
use crate::promise::Promise;
use crate::scheduler::TaskHandle;

/// A boxed success handler: value in, resolution out.
pub(crate) type FulfillHandler<T, U> = Box<dyn FnOnce(T) -> Resolution<U> + Send>;

/// A boxed failure handler: rejection in, resolution out.
pub(crate) type RejectHandler<U> = Box<dyn FnOnce(Rejection) -> Resolution<U> + Send>;

/// Records the task handle scheduled on behalf of a link's downstream.
pub(crate) type TaskRecorder = Box<dyn FnOnce(TaskHandle) + Send>;

/// A dependent registered on a pending promise.
///
/// Each link is scheduled at most once per settlement; consuming methods take
/// the box because the settlement path runs exactly one of them.
pub(crate) trait Reaction<T>: Send {
    /// True if this link reacts to fulfillment.
    fn wants_value(&self) -> bool;

    /// True if this link reacts to rejection (decides the rejection-side
    /// partition: links answering false are starved when any link answers
    /// true).
    fn wants_rejection(&self) -> bool;

    /// Runs the success path inside a scheduled task.
    fn on_fulfilled(self: Box<Self>, value: T);

    /// Runs the failure path inside a scheduled task. Also used for
    /// propagate-through when the link has no failure handler.
    fn on_rejected(self: Box<Self>, rejection: Rejection);

    /// Takes the recorder for this link's downstream, if it has one.
    fn take_task_recorder(&mut self) -> Option<TaskRecorder>;
}

/// The link behind `then`/`catch`: optional handlers and the downstream
/// promise their outcome feeds.
pub(crate) struct ChainLink<T, U> {
    pub(crate) on_fulfilled: Option<FulfillHandler<T, U>>,
    pub(crate) on_rejected: Option<RejectHandler<U>>,
    pub(crate) downstream: Promise<U>,
}

impl<T, U> Reaction<T> for ChainLink<T, U>
where
    T: Send + 'static,
    U: Clone + Send + 'static,
{
    fn wants_value(&self) -> bool {
        self.on_fulfilled.is_some()
    }

    fn wants_rejection(&self) -> bool {
        self.on_rejected.is_some()
    }

    fn on_fulfilled(self: Box<Self>, value: T) {
        let Some(handler) = self.on_fulfilled else {
            return;
        };
        match handler(value) {
            Ok(completion) => self.downstream.feed(completion),
            // Handler failure: recover through the link's own failure handler
            // when present, else fail the downstream.
            Err(rejection) => match self.on_rejected {
                Some(recover) => match recover(rejection) {
                    Ok(completion) => self.downstream.feed(completion),
                    Err(rejection) => self.downstream.feed_rejection(rejection),
                },
                None => self.downstream.feed_rejection(rejection),
            },
        }
    }

    fn on_rejected(self: Box<Self>, rejection: Rejection) {
        match self.on_rejected {
            Some(handler) => match handler(rejection.clone()) {
                Ok(completion) => self.downstream.feed(completion),
                // Tag the replacement failure with the original reason.
                Err(next) => self.downstream.feed_rejection(next.caused_by(rejection)),
            },
            // Propagate-through: same reason, unchanged.
            None => self.downstream.feed_rejection(rejection),
        }
    }

    fn take_task_recorder(&mut self) -> Option<TaskRecorder> {
        let downstream = self.downstream.clone();
        Some(Box::new(move |handle| downstream.note_task(handle)))
    }
}

/// The link registered on a pending inner promise when an outer promise
/// adopts it: both outcomes forward unchanged, with no transformation.
pub(crate) struct AdoptLink<T> {
    pub(crate) adopter: Promise<T>,
}

impl<T> Reaction<T> for AdoptLink<T>
where
    T: Clone + Send + 'static,
{
    fn wants_value(&self) -> bool {
        true
    }

    fn wants_rejection(&self) -> bool {
        true
    }

    fn on_fulfilled(self: Box<Self>, value: T) {
        self.adopter.feed(Completion::Value(value));
    }

    fn on_rejected(self: Box<Self>, rejection: Rejection) {
        self.adopter.feed_rejection(rejection);
    }

    fn take_task_recorder(&mut self) -> Option<TaskRecorder> {
        let adopter = self.adopter.clone();
        Some(Box::new(move |handle| adopter.note_task(handle)))
    }
}

/// An internal observer over a promise's eventual outcome.
///
/// Counts as handling both sides, so a watched rejection never trips the
/// unhandled-rejection policy on the watched promise.
pub(crate) struct WatchLink<T> {
    pub(crate) observer: Box<dyn FnOnce(Result<T, Rejection>) + Send>,
}

impl<T> Reaction<T> for WatchLink<T>
where
    T: Send + 'static,
{
    fn wants_value(&self) -> bool {
        true
    }

    fn wants_rejection(&self) -> bool {
        true
    }

    fn on_fulfilled(self: Box<Self>, value: T) {
        (self.observer)(Ok(value));
    }

    fn on_rejected(self: Box<Self>, rejection: Rejection) {
        (self.observer)(Err(rejection));
    }

    fn take_task_recorder(&mut self) -> Option<TaskRecorder> {
        None
    }
}
