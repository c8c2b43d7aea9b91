//! Collective-wait combinators over fixed collections of promises.
//!
//! Both combinators accept a fixed, already-materialized collection of
//! [`Completion`](crate::promise::Completion) elements, so plain values and
//! promises mix freely. They are counting combinators: each promise element
//! is observed once and a counter (or the write-once settlement of the
//! result) decides the collective outcome. Observed elements count as
//! handled, so an element rejection consumed by a combinator never trips the
//! unhandled-rejection policy; the combinator's own result promise still can.

pub mod all;
pub mod race;

pub use all::all;
pub use race::race;
