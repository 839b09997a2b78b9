//! Bridge between the callback combinators and the compio runtime
//!
//! [`spawn_task`] and [`spawn_step`] turn futures into tasks by running them on
//! the current compio runtime and completing the handle with their output. The
//! `run_*` functions are awaitable forms of the combinators: they start the run
//! and resolve when its final callback fires.
//!
//! All of this is single-threaded. Futures are spawned on the thread that is
//! driving the runtime and need not be `Send`.
//!
//! # Example
//!
//! ```rust,no_run
//! use callflow::runtime::{run_parallel, spawn_task};
//! use callflow::Concurrency;
//! use std::time::Duration;
//!
//! #[compio::main]
//! async fn main() {
//!     let tasks = (0..8_u64)
//!         .map(|i| {
//!             spawn_task(move || async move {
//!                 compio::time::sleep(Duration::from_millis(10 * i)).await;
//!                 Ok::<_, String>(i)
//!             })
//!         })
//!         .collect();
//!
//!     let settled = run_parallel(tasks, Concurrency::Limit(3)).await.unwrap();
//!     assert_eq!(settled.successes(), 8);
//! }
//! ```

use std::future::Future;

use futures::channel::oneshot;
use tracing::debug;

use callflow_core::{
    map_with, parallel_with, serial, Concurrency, Done, FlowError, Settled, Step, Task,
};

/// A task whose body is the future returned by `make`
///
/// The future is created and spawned only when the scheduler launches the task,
/// so an unlaunched task does no work.
pub fn spawn_task<T, E, M, Fut>(make: M) -> Task<T, E>
where
    T: 'static,
    E: 'static,
    M: FnOnce() -> Fut + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
{
    Task::new(move |done| spawn_completion(make(), done))
}

/// A serial step whose body is the future returned by `make(previous_value)`
pub fn spawn_step<T, E, M, Fut>(make: M) -> Step<T, E>
where
    T: 'static,
    E: 'static,
    M: FnOnce(T) -> Fut + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
{
    Step::then(move |input, done| spawn_completion(make(input), done))
}

fn spawn_completion<T, E, Fut>(future: Fut, done: Done<T, E>)
where
    T: 'static,
    E: 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
{
    compio::runtime::spawn(async move {
        done.complete(future.await);
    })
    .detach();
}

/// Run a serial chain and wait for its outcome
///
/// # Errors
///
/// Returns [`FlowError::Task`] with the first step error,
/// [`FlowError::InvalidArguments`] if the first step expects an input, or
/// [`FlowError::Abandoned`] if a step dropped its completion handle.
pub async fn run_serial<T, E>(steps: Vec<Step<T, E>>) -> Result<Option<T>, FlowError<E>>
where
    T: 'static,
    E: 'static,
{
    let (tx, rx) = oneshot::channel();
    serial(steps, move |outcome| {
        if tx.send(outcome).is_err() {
            debug!("Serial outcome dropped: receiver is gone");
        }
    });
    rx.await.unwrap_or(Err(FlowError::Abandoned))
}

/// Run tasks under a concurrency window and wait for every one of them
///
/// Task failures are reported inside [`Settled`], not as an `Err`.
///
/// # Errors
///
/// Returns [`FlowError::Abandoned`] if a task dropped its completion handle, in
/// which case the run can never settle.
pub async fn run_parallel<T, E>(
    tasks: Vec<Task<T, E>>,
    concurrency: Concurrency,
) -> Result<Settled<T, E>, FlowError<E>>
where
    T: 'static,
    E: 'static,
{
    let (tx, rx) = oneshot::channel();
    parallel_with(tasks, concurrency, move |settled| {
        if tx.send(settled).is_err() {
            debug!("Parallel outcome dropped: receiver is gone");
        }
    });
    rx.await.map_err(|_| FlowError::Abandoned)
}

/// Map `f` over `values` under a concurrency window and wait for every call
///
/// # Errors
///
/// Returns [`FlowError::Abandoned`] if a call dropped its completion handle.
pub async fn run_map<V, T, E, I, F>(
    values: I,
    concurrency: Concurrency,
    f: F,
) -> Result<Settled<T, E>, FlowError<E>>
where
    I: IntoIterator<Item = V>,
    V: 'static,
    T: 'static,
    E: 'static,
    F: Fn(V, Done<T, E>) + 'static,
{
    let (tx, rx) = oneshot::channel();
    map_with(values, concurrency, f, move |settled| {
        if tx.send(settled).is_err() {
            debug!("Map outcome dropped: receiver is gone");
        }
    });
    rx.await.map_err(|_| FlowError::Abandoned)
}
