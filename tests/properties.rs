//! Property tests for the settlement state machine.

mod common;
use common::{capturing_lab, lab};

use deferred::{all, Completion, Promise};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum SettleOp {
    Fulfill(i32),
    Reject(String),
}

fn settle_op() -> impl Strategy<Value = SettleOp> {
    prop_oneof![
        any::<i32>().prop_map(SettleOp::Fulfill),
        "[a-z]{1,6}".prop_map(SettleOp::Reject),
    ]
}

proptest! {
    /// Whatever sequence of settlement attempts arrives, only the first one
    /// is observable.
    #[test]
    fn settlement_is_write_once(ops in proptest::collection::vec(settle_op(), 1..8)) {
        let (lab, sched) = capturing_lab();
        let (promise, completer) = Promise::deferred(&sched);

        for op in &ops {
            match op {
                SettleOp::Fulfill(value) => {
                    let _ = completer.fulfill(*value);
                }
                SettleOp::Reject(message) => completer.reject(message.as_str()),
            }
        }
        lab.run_until_idle();

        match &ops[0] {
            SettleOp::Fulfill(value) => prop_assert_eq!(promise.value(), Some(*value)),
            SettleOp::Reject(message) => {
                let rejection = promise.rejection();
                prop_assert_eq!(
                    rejection.map(|r| r.message().to_string()),
                    Some(message.clone())
                );
            }
        }
    }

    /// `all` over plain values is the identity on the collection.
    #[test]
    fn all_of_plain_values_is_identity(values in proptest::collection::vec(any::<i32>(), 0..16)) {
        let (lab, sched) = lab();
        let result = all(&sched, values.iter().copied().map(Completion::value));
        lab.run_until_idle();
        prop_assert_eq!(result.value(), Some(values));
    }

    /// A chain of identity handlers preserves the fulfilled value at any
    /// depth.
    #[test]
    fn identity_chain_preserves_value(value in any::<i32>(), depth in 0usize..8) {
        let (lab, sched) = lab();
        let (promise, completer) = Promise::deferred(&sched);

        let mut chained = promise.clone();
        for _ in 0..depth {
            chained = chained.then(|v| Ok(Completion::value(v)));
        }
        completer.fulfill(value).unwrap();
        lab.run_until_idle();

        prop_assert_eq!(chained.value(), Some(value));
    }
}
