//! Lift synchronous functions into the task contract

use std::panic::{self, AssertUnwindSafe};

use crate::error::TaskPanic;
use crate::task::Done;

/// Wrap `f` so it can be used wherever an input-taking task is expected
///
/// The returned callable evaluates `f` and completes the handle inline with its
/// result. It fits [`Step::then`](crate::Step::then) and [`map`](crate::map).
///
/// # Example
///
/// ```rust
/// use callflow_core::{make_async, map};
///
/// let parse = make_async(|s: &'static str| s.parse::<u32>());
/// map(vec!["1", "x"], parse, |settled| {
///     assert!(settled.error.is_some());
///     assert_eq!(settled.results, vec![Some(1), None]);
/// });
/// ```
pub fn make_async<I, O, E, F>(f: F) -> impl Fn(I, Done<O, E>)
where
    F: Fn(I) -> Result<O, E>,
{
    move |input, done| done.complete(f(input))
}

/// Like [`make_async`], but a panic inside `f` is caught and reported as an error
pub fn make_async_catching<I, O, E, F>(f: F) -> impl Fn(I, Done<O, E>)
where
    F: Fn(I) -> Result<O, E>,
    E: From<TaskPanic>,
{
    move |input, done| {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(input)))
            .unwrap_or_else(|payload| Err(E::from(TaskPanic::from_payload(payload))));
        done.complete(outcome);
    }
}
