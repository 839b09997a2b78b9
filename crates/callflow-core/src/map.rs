//! Apply one task-shaped function to every value of a collection

use std::rc::Rc;

use crate::concurrency::Concurrency;
use crate::parallel::{parallel_with, Settled};
use crate::task::{Done, Task};

/// Run `f` once per value, all at once
///
/// Results are aligned with the input order, whatever order the calls complete in.
///
/// # Example
///
/// ```rust
/// use callflow_core::{map, Done};
///
/// map(vec![1, 2], |value: u32, done: Done<u32, String>| done.ok(value + 1), |settled| {
///     assert_eq!(settled.into_result(), Ok(vec![2, 3]));
/// });
/// ```
pub fn map<V, T, E, I, F, C>(values: I, f: F, callback: C)
where
    I: IntoIterator<Item = V>,
    V: 'static,
    T: 'static,
    E: 'static,
    F: Fn(V, Done<T, E>) + 'static,
    C: FnOnce(Settled<T, E>) + 'static,
{
    map_with(values, Concurrency::Unbounded, f, callback);
}

/// Like [`map`], with at most `limit` calls in flight
pub fn map_limit<V, T, E, I, F, C>(values: I, limit: usize, f: F, callback: C)
where
    I: IntoIterator<Item = V>,
    V: 'static,
    T: 'static,
    E: 'static,
    F: Fn(V, Done<T, E>) + 'static,
    C: FnOnce(Settled<T, E>) + 'static,
{
    map_with(values, Concurrency::Limit(limit), f, callback);
}

/// Bind each value to `f` and hand the resulting tasks to the scheduler
pub fn map_with<V, T, E, I, F, C>(values: I, concurrency: Concurrency, f: F, callback: C)
where
    I: IntoIterator<Item = V>,
    V: 'static,
    T: 'static,
    E: 'static,
    F: Fn(V, Done<T, E>) + 'static,
    C: FnOnce(Settled<T, E>) + 'static,
{
    let f = Rc::new(f);
    let tasks = values
        .into_iter()
        .map(|value| {
            let f = Rc::clone(&f);
            Task::new(move |done| f(value, done))
        })
        .collect();
    parallel_with(tasks, concurrency, callback);
}
