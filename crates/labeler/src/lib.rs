//! The labeler core: decision logic, prompt assembly, signed publication,
//! and the dispatch entry point.
//!
//! Everything here works against the traits in `sortinghat-core`, so the
//! classifier, profile provider, and store can all be swapped for test
//! doubles.

pub mod definitions;
pub mod dispatch;
pub mod prompt;
pub mod resolver;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{Dispatcher, Outcome};
pub use resolver::{Decision, decide};
pub use sink::SignedSink;
