//! Wait for the first settled element of a collection.

use std::sync::Arc;

use crate::promise::{Completion, Promise};
use crate::scheduler::SchedulerRef;

/// Produces a promise that settles with the outcome of whichever element
/// settles first; it rejects if that first outcome is a rejection.
///
/// Plain values are already settled and are scheduled immediately, so they
/// beat any still-pending promise. Ties are broken by task order: the first
/// outcome to reach the scheduler wins the result's write-once settlement.
/// An empty collection stays pending forever.
pub fn race<T, I>(scheduler: &SchedulerRef, items: I) -> Promise<T>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Completion<T>>,
{
    let result = Promise::with_scheduler(Arc::clone(scheduler));
    for item in items {
        match item {
            Completion::Value(value) => {
                let settle = result.clone();
                let handle =
                    scheduler.schedule(Box::new(move || settle.feed(Completion::Value(value))));
                result.note_task(handle);
            }
            Completion::Chain(promise) => {
                let result = result.clone();
                promise.watch(move |outcome| match outcome {
                    Ok(value) => result.feed(Completion::Value(value)),
                    Err(rejection) => result.feed_rejection(rejection),
                });
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab::LabScheduler;
    use crate::promise::StateKind;

    #[test]
    fn plain_value_beats_pending_promise() {
        let lab = LabScheduler::new();
        let sched: SchedulerRef = lab.clone();
        let (pending, _completer) = Promise::deferred(&sched);

        let result = race(&sched, [Completion::chain(pending), Completion::value(9)]);
        lab.run_until_idle();
        assert_eq!(result.value(), Some(9));
    }

    #[test]
    fn empty_collection_never_settles() {
        let lab = LabScheduler::new();
        let sched: SchedulerRef = lab.clone();

        let result = race::<i32, _>(&sched, []);
        lab.run_until_idle();
        assert_eq!(result.state(), StateKind::Pending);
    }

    #[test]
    fn first_rejection_wins() {
        let lab = LabScheduler::capturing();
        let sched: SchedulerRef = lab.clone();

        let result: Promise<i32> = race(
            &sched,
            [
                Completion::chain(Promise::reject(&sched, "boom")),
                Completion::chain(Promise::resolve(&sched, 1)),
            ],
        );
        lab.run_until_idle();
        assert_eq!(result.state(), StateKind::Rejected);
        assert_eq!(lab.unhandled().len(), 1);
    }
}
