#![allow(dead_code)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```
//! mod common;
//! use common::*;
//! ```

use std::sync::{Arc, Once};

use deferred::{LabScheduler, SchedulerRef};
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// A lab scheduler with the fatal unhandled-rejection policy, plus its
/// capability handle.
pub fn lab() -> (Arc<LabScheduler>, SchedulerRef) {
    let lab = LabScheduler::new();
    let scheduler: SchedulerRef = lab.clone();
    (lab, scheduler)
}

/// A lab scheduler that records unhandled rejections for assertion.
pub fn capturing_lab() -> (Arc<LabScheduler>, SchedulerRef) {
    let lab = LabScheduler::capturing();
    let scheduler: SchedulerRef = lab.clone();
    (lab, scheduler)
}
