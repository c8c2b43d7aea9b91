//! Deferred: single-assignment deferred values with scheduler-driven
//! settlement.
//!
//! # Overview
//!
//! A [`Promise`] represents the eventual result of an operation that
//! completes asynchronously. The crate's core is the value-settlement state
//! machine: a promise transitions out of pending exactly once, fans its
//! outcome out to dependents by scheduling one task per dependent, and
//! chains of dependents are built by `then`-style composition and unwound by
//! settlement. The task queue that actually runs deferred callbacks is an
//! external capability: hosts implement [`Schedule`], and the crate ships a
//! deterministic FIFO [`LabScheduler`] for tests and reference use.
//!
//! # Core Guarantees
//!
//! - **Write-once settlement**: a promise settles at most once; later
//!   attempts are silent no-ops
//! - **Async-only handlers**: handlers and adopted outcomes are always
//!   scheduled, never invoked inside the call that registered or settled
//!   them
//! - **No silent failure loss**: handler failures are recovered into the
//!   chain; a rejection with no failure handler anywhere surfaces through
//!   the host's unhandled-rejection policy
//! - **No ambient authority**: every promise settles through an explicit
//!   scheduler capability; there is no global queue
//!
//! # Module Structure
//!
//! - [`promise`]: the settlement state machine, chaining, and constructors
//! - [`combinator`]: collective waits over fixed collections ([`all`],
//!   [`race`])
//! - [`scheduler`]: the external scheduling capability and task handles
//! - [`error`]: rejection reasons and their cause chains
//! - [`lab`]: deterministic FIFO scheduler for tests
//!
//! # Example
//!
//! ```
//! use deferred::{Completion, LabScheduler, Promise, SchedulerRef};
//!
//! let lab = LabScheduler::new();
//! let scheduler: SchedulerRef = lab.clone();
//!
//! let doubled = Promise::resolve(&scheduler, 3)
//!     .then(|v| Ok(Completion::value(v + 1)))
//!     .then(|v| Ok(Completion::value(v * 2)));
//!
//! lab.run_until_idle();
//! assert_eq!(doubled.value(), Some(8));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod combinator;
pub mod error;
pub mod lab;
pub mod promise;
pub mod scheduler;

pub use combinator::{all, race};
pub use error::{Rejection, RejectionKind};
pub use lab::{LabScheduler, UnhandledPolicy};
pub use promise::{Completer, Completion, Promise, Resolution, StateKind};
pub use scheduler::{Schedule, SchedulerRef, Task, TaskHandle};
