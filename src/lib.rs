//! callflow: callback-style async control flow
//!
//! This library composes independently-invocable asynchronous operations
//! without hand-written counters: run them in order with result passing
//! ([`serial`]), under a concurrency cap with index-aligned results
//! ([`parallel`], [`parallel_limit`]), or map one operation over a collection
//! ([`map`]). [`make_async`] lifts a synchronous function into the same calling
//! convention.
//!
//! The combinators themselves live in `callflow-core` and are executor-agnostic.
//! The [`runtime`] module runs futures as tasks on compio and offers awaitable
//! forms of every combinator.

pub mod runtime;

// Re-export commonly used types
pub use callflow_core::{
    make_async, make_async_catching, map, map_limit, map_with, parallel, parallel_limit,
    parallel_with, serial, Concurrency, Done, FlowError, Result, Settled, Step, Task, TaskPanic,
};
pub use runtime::{run_map, run_parallel, run_serial, spawn_step, spawn_task};
