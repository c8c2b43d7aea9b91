//! Rejection reasons and their diagnostics.
//!
//! A [`Rejection`] is the failure payload that flows through a promise chain.
//! Error handling follows these principles:
//!
//! - Rejections are explicit and typed (the message is a description, the
//!   kind is the classification)
//! - A rejection produced while handling another rejection is tagged with the
//!   original as its cause, so diagnostics keep the full failure history
//! - Validation failures that the type system can rule out (a `then` with no
//!   handler, a non-iterable combinator input) are not runtime states
//!
//! # Kinds
//!
//! - [`RejectionKind::Reason`]: an application-supplied failure
//! - [`RejectionKind::SelfResolution`]: a promise was asked to adopt itself

use core::fmt;
use std::sync::Arc;

/// The classification of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// An application-supplied failure reason.
    Reason,
    /// A promise was resolved with itself (raised synchronously to the
    /// caller of the settlement entry point, never scheduled).
    SelfResolution,
}

impl RejectionKind {
    /// Returns true for kinds produced by settlement validation rather than
    /// by application code.
    #[must_use]
    pub const fn is_validation(self) -> bool {
        matches!(self, Self::SelfResolution)
    }
}

/// A failure reason carried by a rejected promise.
///
/// Cheap to clone; the message and cause chain are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    kind: RejectionKind,
    message: Arc<str>,
    cause: Option<Arc<Rejection>>,
}

impl Rejection {
    /// Creates an application rejection with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: RejectionKind::Reason,
            message: message.into().into(),
            cause: None,
        }
    }

    /// Creates the validation rejection for a promise resolved with itself.
    #[must_use]
    pub(crate) fn self_resolution() -> Self {
        Self {
            kind: RejectionKind::SelfResolution,
            message: "a promise cannot be resolved with itself".into(),
            cause: None,
        }
    }

    /// Returns the rejection kind.
    #[must_use]
    pub const fn kind(&self) -> RejectionKind {
        self.kind
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Tags this rejection with the rejection it superseded.
    ///
    /// Used when a failure handler itself fails: the new rejection keeps the
    /// original reason as its cause.
    #[must_use]
    pub fn caused_by(mut self, cause: Self) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Returns the rejection that caused this one, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Rejection> {
        self.cause.as_deref()
    }

    /// Walks the cause chain to the original rejection.
    #[must_use]
    pub fn root_cause(&self) -> &Rejection {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Rejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl From<&str> for Rejection {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for Rejection {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
