//! callflow-core: callback combinators for single-threaded async code
//!
//! Tasks are callables that receive a one-shot [`Done`] handle and complete it
//! exactly once. This crate composes them:
//!
//! - [`serial`] - run steps in order, feeding each value into the next
//! - [`parallel`] / [`parallel_limit`] - run tasks under a concurrency window and
//!   collect index-aligned results plus the first error
//! - [`map`] / [`map_limit`] - apply one function to every value of a collection
//! - [`make_async`] - lift a synchronous fallible function into the task contract
//!
//! Nothing here depends on an executor. Completions may arrive inline or from any
//! event source running on the same thread.
//!
//! # Example
//!
//! ```rust
//! use callflow_core::{parallel_limit, Task};
//!
//! let tasks: Vec<Task<u32, String>> = (1..=4)
//!     .map(|n| Task::new(move |done| done.ok(n * n)))
//!     .collect();
//! parallel_limit(tasks, 2, |settled| {
//!     assert_eq!(settled.into_result(), Ok(vec![1, 4, 9, 16]));
//! });
//! ```

mod adapter;
mod concurrency;
pub mod error;
mod map;
mod parallel;
mod serial;
mod task;

#[cfg(test)]
mod testing;

pub use adapter::{make_async, make_async_catching};
pub use concurrency::Concurrency;
pub use error::{FlowError, Result, TaskPanic};
pub use map::{map, map_limit, map_with};
pub use parallel::{parallel, parallel_limit, parallel_with, Settled};
pub use serial::serial;
pub use task::{Done, Step, Task};
