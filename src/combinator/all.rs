//! Wait for every element of a collection.

use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::promise::{Completion, Promise};
use crate::scheduler::SchedulerRef;

struct Gather<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

fn complete_slot<T>(gather: &Mutex<Gather<T>>, index: usize, value: T) -> Option<Vec<T>> {
    let mut gather = gather.lock();
    if gather.slots[index].is_none() {
        gather.slots[index] = Some(value);
        gather.remaining -= 1;
    }
    if gather.remaining == 0 {
        let slots = mem::take(&mut gather.slots);
        Some(
            slots
                .into_iter()
                .map(|slot| slot.expect("every slot filled before completion"))
                .collect(),
        )
    } else {
        None
    }
}

/// Produces a promise that fulfills with the ordered outcomes of every
/// element, or rejects with the reason of the first element found rejected.
///
/// Plain values pass through into their slot unchanged; promise elements
/// contribute their fulfilled value. An empty collection fulfills with an
/// empty sequence. The result always settles on a scheduled task, never
/// inside this call.
pub fn all<T, I>(scheduler: &SchedulerRef, items: I) -> Promise<Vec<T>>
where
    T: Clone + Send + 'static,
    I: IntoIterator<Item = Completion<T>>,
{
    let result = Promise::with_scheduler(Arc::clone(scheduler));
    let items: Vec<Completion<T>> = items.into_iter().collect();
    let total = items.len();
    let gather = Arc::new(Mutex::new(Gather {
        slots: (0..total).map(|_| None).collect(),
        remaining: total,
    }));

    let mut ready = if total == 0 { Some(Vec::new()) } else { None };
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Completion::Value(value) => {
                if let Some(values) = complete_slot(&gather, index, value) {
                    ready = Some(values);
                }
            }
            Completion::Chain(promise) => {
                let gather = Arc::clone(&gather);
                let result = result.clone();
                promise.watch(move |outcome| match outcome {
                    Ok(value) => {
                        if let Some(values) = complete_slot(&gather, index, value) {
                            result.feed(Completion::Value(values));
                        }
                    }
                    Err(rejection) => result.feed_rejection(rejection),
                });
            }
        }
    }
    if let Some(values) = ready {
        // Every element was a plain value; the result still settles on its
        // own task.
        let settle = result.clone();
        let handle = scheduler.schedule(Box::new(move || settle.feed(Completion::Value(values))));
        result.note_task(handle);
    }
    result
}
