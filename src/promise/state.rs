//! Settlement state and the inputs a settlement entry point accepts.

use crate::error::Rejection;
use crate::promise::Promise;

/// The write-once settlement state of a promise.
///
/// `Pending` is initial; the other two are terminal. The transition out of
/// `Pending` happens at most once.
pub(crate) enum State<T> {
    /// Not yet settled.
    Pending,
    /// Settled with a success value.
    Fulfilled(T),
    /// Settled with a failure reason.
    Rejected(Rejection),
}

impl<T> State<T> {
    pub(crate) const fn kind(&self) -> StateKind {
        match self {
            Self::Pending => StateKind::Pending,
            Self::Fulfilled(_) => StateKind::Fulfilled,
            Self::Rejected(_) => StateKind::Rejected,
        }
    }

    pub(crate) const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// The public discriminant of a promise's settlement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// Not yet settled.
    Pending,
    /// Settled with a success value.
    Fulfilled,
    /// Settled with a failure reason.
    Rejected,
}

impl StateKind {
    /// Returns true once the promise has left `Pending`.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// What a success-side settlement entry point accepts: a plain value, or
/// another promise whose eventual outcome is adopted.
#[derive(Clone)]
pub enum Completion<T> {
    /// A plain outcome; settles the promise directly.
    Value(T),
    /// Another promise; the settling promise adopts its eventual outcome.
    Chain(Promise<T>),
}

impl<T> Completion<T> {
    /// Wraps a plain value.
    #[must_use]
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// Wraps a promise for adoption.
    #[must_use]
    pub fn chain(promise: Promise<T>) -> Self {
        Self::Chain(promise)
    }
}

impl<T> From<T> for Completion<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T> From<Promise<T>> for Completion<T> {
    fn from(promise: Promise<T>) -> Self {
        Self::Chain(promise)
    }
}

/// What a handler produces: a normal return (possibly another promise to
/// adopt), or a failure that flows down the rejection path.
pub type Resolution<T> = Result<Completion<T>, Rejection>;
