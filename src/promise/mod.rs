//! The single-assignment promise and its settlement engine.
//!
//! A [`Promise`] is a write-once container for an eventual outcome. It moves
//! from pending to fulfilled or rejected exactly once; a second settlement
//! attempt is a silent no-op. Settlement fans the outcome out to every
//! dependent link by scheduling one task per dependent on the host
//! [`Schedule`](crate::scheduler::Schedule) capability — handlers never run
//! inside the call that triggered settlement.
//!
//! # Settlement paths
//!
//! - **Fulfillment** with a plain value stores it and schedules each
//!   dependent that registered a success handler, in registration order.
//! - **Fulfillment** with another promise ("adoption") never settles
//!   synchronously: a settled inner promise has its outcome re-scheduled into
//!   this one; a pending inner promise gets a forwarding link.
//! - **Rejection** stores the reason and partitions dependents: links with a
//!   failure handler win the fan-out; if none exist, links with only a
//!   success handler have the reason forwarded through to their downstream
//!   promises; if there are no links at all, the rejection is unhandled and
//!   the host policy fires at the point of settlement.
//!
//! Each promise owns its own state and dependent list; nothing outside its
//! settlement entry points mutates them. The mutex exists so the engine is
//! safe to hand across threads, not as a coordination protocol.

mod link;
mod state;

pub use state::{Completion, Resolution, StateKind};

use core::fmt;
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Rejection;
use crate::promise::link::{AdoptLink, ChainLink, FulfillHandler, Reaction, RejectHandler, WatchLink};
use crate::promise::state::State;
use crate::scheduler::{SchedulerRef, TaskHandle};

struct Core<T> {
    state: State<T>,
    /// Append-only while pending; drained at settlement.
    dependents: Vec<Box<dyn Reaction<T>>>,
    /// Most recent task scheduled on behalf of this promise (bookkeeping
    /// only; never read back by the engine).
    pending_task: Option<TaskHandle>,
}

/// A single-assignment container for an asynchronously produced outcome.
///
/// Cloning yields another handle to the same underlying promise.
pub struct Promise<T> {
    core: Arc<Mutex<Core<T>>>,
    scheduler: SchedulerRef,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            scheduler: Arc::clone(&self.scheduler),
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.lock();
        f.debug_struct("Promise")
            .field("state", &core.state.kind())
            .field("dependents", &core.dependents.len())
            .field("pending_task", &core.pending_task)
            .finish()
    }
}

impl<T> Promise<T> {
    /// Returns the current settlement state.
    #[must_use]
    pub fn state(&self) -> StateKind {
        self.core.lock().state.kind()
    }

    /// Returns true while the promise is unsettled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == StateKind::Pending
    }

    /// Returns the most recent task handle scheduled on behalf of this
    /// promise's settlement or propagation, for diagnostics.
    #[must_use]
    pub fn pending_task(&self) -> Option<TaskHandle> {
        self.core.lock().pending_task
    }

    /// Returns the scheduler this promise settles through.
    #[must_use]
    pub fn scheduler(&self) -> &SchedulerRef {
        &self.scheduler
    }

    /// Returns the failure reason if the promise has rejected.
    #[must_use]
    pub fn rejection(&self) -> Option<Rejection> {
        match &self.core.lock().state {
            State::Rejected(rejection) => Some(rejection.clone()),
            _ => None,
        }
    }

    pub(crate) fn note_task(&self, handle: TaskHandle) {
        self.core.lock().pending_task = Some(handle);
    }
}

impl<T> Promise<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a promise and schedules its producer.
    ///
    /// The producer receives a [`Completer`] bound to the new promise and
    /// runs as its own task. A producer that returns `Err` rejects the
    /// promise with that reason.
    pub fn new<P>(scheduler: &SchedulerRef, producer: P) -> Self
    where
        P: FnOnce(Completer<T>) -> Result<(), Rejection> + Send + 'static,
    {
        let promise = Self::with_scheduler(Arc::clone(scheduler));
        let completer = Completer {
            promise: promise.clone(),
        };
        let fallback = completer.clone();
        let handle = scheduler.schedule(Box::new(move || {
            if let Err(rejection) = producer(completer) {
                fallback.reject(rejection);
            }
        }));
        promise.note_task(handle);
        promise
    }

    /// Creates an unsettled promise and the completer that settles it.
    #[must_use]
    pub fn deferred(scheduler: &SchedulerRef) -> (Self, Completer<T>) {
        let promise = Self::with_scheduler(Arc::clone(scheduler));
        let completer = Completer {
            promise: promise.clone(),
        };
        (promise, completer)
    }

    /// Creates a promise whose producer immediately fulfills it.
    ///
    /// Settlement still routes through the full adoption logic, so resolving
    /// with another promise adopts its outcome rather than nesting.
    pub fn resolve(scheduler: &SchedulerRef, completion: impl Into<Completion<T>>) -> Self {
        let completion = completion.into();
        Self::new(scheduler, move |completer| completer.fulfill(completion))
    }

    /// Creates a promise whose producer immediately rejects it.
    pub fn reject(scheduler: &SchedulerRef, rejection: impl Into<Rejection>) -> Self {
        let rejection = rejection.into();
        Self::new(scheduler, move |completer| {
            completer.reject(rejection);
            Ok(())
        })
    }

    /// Returns the success value if the promise has fulfilled.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        match &self.core.lock().state {
            State::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Registers a success handler; returns the downstream promise fed by
    /// its outcome.
    ///
    /// If this promise later rejects, the reason is forwarded through to the
    /// downstream promise unchanged.
    pub fn then<U, F>(&self, on_fulfilled: F) -> Promise<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Resolution<U> + Send + 'static,
    {
        self.register(Some(Box::new(on_fulfilled)), None)
    }

    /// Registers both a success and a failure handler.
    ///
    /// A failure produced by the success handler is recovered through the
    /// failure handler before it reaches the downstream promise.
    pub fn then_catch<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Promise<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Resolution<U> + Send + 'static,
        R: FnOnce(Rejection) -> Resolution<U> + Send + 'static,
    {
        self.register(Some(Box::new(on_fulfilled)), Some(Box::new(on_rejected)))
    }

    /// Registers only a failure handler.
    ///
    /// If this promise fulfills instead, the handler never runs and the
    /// downstream promise stays pending along this path.
    pub fn catch<R>(&self, on_rejected: R) -> Promise<T>
    where
        R: FnOnce(Rejection) -> Resolution<T> + Send + 'static,
    {
        self.register(None, Some(Box::new(on_rejected)))
    }

    pub(crate) fn with_scheduler(scheduler: SchedulerRef) -> Self {
        Self {
            core: Arc::new(Mutex::new(Core {
                state: State::Pending,
                dependents: Vec::new(),
                pending_task: None,
            })),
            scheduler,
        }
    }

    fn register<U>(
        &self,
        on_fulfilled: Option<FulfillHandler<T, U>>,
        on_rejected: Option<RejectHandler<U>>,
    ) -> Promise<U>
    where
        U: Clone + Send + 'static,
    {
        let replay = {
            let mut guard = self.core.lock();
            let core = &mut *guard;
            match &core.state {
                State::Pending => {
                    let downstream = Promise::with_scheduler(Arc::clone(&self.scheduler));
                    core.dependents.push(Box::new(ChainLink {
                        on_fulfilled,
                        on_rejected,
                        downstream: downstream.clone(),
                    }));
                    return downstream;
                }
                State::Fulfilled(value) => Ok(value.clone()),
                State::Rejected(rejection) => Err(rejection.clone()),
            }
        };
        // Already settled: delegate to a fresh promise replaying the stored
        // outcome, so handlers are still scheduled, never run inline.
        match replay {
            Ok(value) => Promise::resolve(&self.scheduler, value).register(on_fulfilled, on_rejected),
            Err(rejection) => {
                Promise::reject(&self.scheduler, rejection).register(on_fulfilled, on_rejected)
            }
        }
    }

    /// The complete-success settlement entry point.
    ///
    /// Returns the self-resolution rejection synchronously when asked to
    /// adopt this same promise; every other path is a state transition or a
    /// silent no-op.
    pub(crate) fn settle(&self, completion: Completion<T>) -> Result<(), Rejection> {
        match completion {
            Completion::Chain(inner) => self.adopt(inner),
            Completion::Value(value) => {
                self.fulfill_value(value);
                Ok(())
            }
        }
    }

    fn adopt(&self, inner: Promise<T>) -> Result<(), Rejection> {
        if !self.is_pending() {
            return Ok(());
        }
        if Arc::ptr_eq(&self.core, &inner.core) {
            return Err(Rejection::self_resolution());
        }
        let settled = {
            let mut guard = inner.core.lock();
            let core = &mut *guard;
            match &core.state {
                State::Pending => {
                    core.dependents.push(Box::new(AdoptLink {
                        adopter: self.clone(),
                    }));
                    return Ok(());
                }
                State::Fulfilled(value) => Ok(value.clone()),
                State::Rejected(rejection) => Err(rejection.clone()),
            }
        };
        // The inner promise is already settled; adoption still never settles
        // synchronously.
        let adopter = self.clone();
        let handle = match settled {
            Ok(value) => self
                .scheduler
                .schedule(Box::new(move || adopter.feed(Completion::Value(value)))),
            Err(rejection) => self
                .scheduler
                .schedule(Box::new(move || adopter.feed_rejection(rejection))),
        };
        self.note_task(handle);
        Ok(())
    }

    fn fulfill_value(&self, value: T) {
        let links = {
            let mut guard = self.core.lock();
            if !guard.state.is_pending() {
                return;
            }
            guard.state = State::Fulfilled(value.clone());
            mem::take(&mut guard.dependents)
        };
        tracing::trace!(dependents = links.len(), "promise fulfilled");
        for mut link in links {
            // Links without a success handler are never scheduled here.
            if !link.wants_value() {
                continue;
            }
            let recorder = link.take_task_recorder();
            let value = value.clone();
            let handle = self
                .scheduler
                .schedule(Box::new(move || link.on_fulfilled(value)));
            if let Some(record) = recorder {
                record(handle);
            }
        }
    }

    /// The complete-failure settlement entry point.
    pub(crate) fn settle_rejected(&self, rejection: Rejection) {
        let links = {
            let mut guard = self.core.lock();
            if !guard.state.is_pending() {
                return;
            }
            guard.state = State::Rejected(rejection.clone());
            mem::take(&mut guard.dependents)
        };
        let any_catcher = links.iter().any(|link| link.wants_rejection());
        let any_forward = links.iter().any(|link| link.wants_value());
        if any_catcher {
            tracing::trace!(dependents = links.len(), "promise rejected; dispatching failure handlers");
            for mut link in links {
                // Success-only links are starved when a failure handler
                // exists anywhere in the dependent list.
                if !link.wants_rejection() {
                    continue;
                }
                let recorder = link.take_task_recorder();
                let rejection = rejection.clone();
                let handle = self
                    .scheduler
                    .schedule(Box::new(move || link.on_rejected(rejection)));
                if let Some(record) = recorder {
                    record(handle);
                }
            }
        } else if any_forward {
            tracing::trace!(dependents = links.len(), "promise rejected; forwarding reason downstream");
            for mut link in links {
                let recorder = link.take_task_recorder();
                let rejection = rejection.clone();
                let handle = self
                    .scheduler
                    .schedule(Box::new(move || link.on_rejected(rejection)));
                if let Some(record) = recorder {
                    record(handle);
                }
            }
        } else {
            tracing::error!(reason = %rejection, "unhandled rejection");
            self.scheduler.unhandled_rejection(rejection);
        }
    }

    /// Settles this promise from inside a scheduled task, where a
    /// self-resolution has no caller to surface to: it becomes this
    /// promise's failure instead.
    pub(crate) fn feed(&self, completion: Completion<T>) {
        if let Err(rejection) = self.settle(completion) {
            self.settle_rejected(rejection);
        }
    }

    pub(crate) fn feed_rejection(&self, rejection: Rejection) {
        self.settle_rejected(rejection);
    }

    /// Observes the eventual outcome of this promise.
    ///
    /// The observer always runs on the scheduler, even when the promise is
    /// already settled, and counts as handling a rejection.
    pub(crate) fn watch(&self, observer: impl FnOnce(Result<T, Rejection>) + Send + 'static) {
        let outcome = {
            let mut guard = self.core.lock();
            let core = &mut *guard;
            match &core.state {
                State::Pending => {
                    core.dependents.push(Box::new(WatchLink {
                        observer: Box::new(observer),
                    }));
                    return;
                }
                State::Fulfilled(value) => Ok(value.clone()),
                State::Rejected(rejection) => Err(rejection.clone()),
            }
        };
        self.scheduler.schedule(Box::new(move || observer(outcome)));
    }
}

/// The settlement capability for a promise: the two entry points a producer
/// (or an external completion source) drives.
pub struct Completer<T> {
    promise: Promise<T>,
}

impl<T> Clone for Completer<T> {
    fn clone(&self) -> Self {
        Self {
            promise: self.promise.clone(),
        }
    }
}

impl<T> fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer")
            .field("promise", &self.promise)
            .finish()
    }
}

impl<T> Completer<T>
where
    T: Clone + Send + 'static,
{
    /// Fulfills the promise with a value or adopts another promise.
    ///
    /// A silent no-op once the promise has settled. Returns an error only
    /// when asked to resolve the promise with itself; the error is raised to
    /// the caller, never scheduled.
    pub fn fulfill(&self, completion: impl Into<Completion<T>>) -> Result<(), Rejection> {
        self.promise.settle(completion.into())
    }

    /// Rejects the promise with the given reason.
    ///
    /// A silent no-op once the promise has settled.
    pub fn reject(&self, rejection: impl Into<Rejection>) {
        self.promise.settle_rejected(rejection.into());
    }
}
