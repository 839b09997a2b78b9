//! The task contract
//!
//! A task is a callable that receives a one-shot [`Done`] handle and completes it
//! exactly once with `Ok(value)` or `Err(error)`. Completion may happen inline,
//! before the task returns, or later from whatever drives the underlying I/O.
//! `Done::complete` takes `self`, so the "exactly once" half of the contract is
//! enforced by the type system; the "at least once" half is on the task.

use std::fmt;

use tracing::warn;

type Callback<T, E> = Box<dyn FnOnce(Result<T, E>)>;

/// One-shot completion handle given to every task
///
/// # Example
///
/// ```rust
/// use callflow_core::Done;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&seen);
/// let done: Done<u32, String> = Done::new(move |outcome| sink.set(outcome.unwrap()));
/// done.ok(7);
/// assert_eq!(seen.get(), 7);
/// ```
pub struct Done<T, E> {
    callback: Option<Callback<T, E>>,
}

impl<T, E> Done<T, E> {
    /// Wrap a continuation that receives the task outcome
    pub fn new(callback: impl FnOnce(Result<T, E>) + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Report the task outcome
    pub fn complete(mut self, outcome: Result<T, E>) {
        if let Some(callback) = self.callback.take() {
            callback(outcome);
        }
    }

    /// Report success
    pub fn ok(self, value: T) {
        self.complete(Ok(value));
    }

    /// Report failure
    pub fn err(self, error: E) {
        self.complete(Err(error));
    }
}

impl<T, E> Drop for Done<T, E> {
    fn drop(&mut self) {
        if self.callback.is_some() {
            warn!("Completion handle dropped unused; the combinator will never settle");
        }
    }
}

impl<T, E> fmt::Debug for Done<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

/// A zero-input task
pub struct Task<T, E> {
    body: Box<dyn FnOnce(Done<T, E>)>,
}

impl<T, E> Task<T, E> {
    /// Wrap a closure obeying the task contract
    pub fn new(body: impl FnOnce(Done<T, E>) + 'static) -> Self {
        Self {
            body: Box::new(body),
        }
    }

    /// A task that completes inline with a fixed outcome
    pub fn ready(outcome: Result<T, E>) -> Self
    where
        T: 'static,
        E: 'static,
    {
        Self::new(move |done| done.complete(outcome))
    }

    /// Invoke the task, handing it its completion handle
    pub fn run(self, done: Done<T, E>) {
        (self.body)(done);
    }
}

impl<T, E> fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Task")
    }
}

/// One element of a serial chain
///
/// The first element of a chain has nothing to consume, so it must be a
/// [`Step::Start`]. Later elements are usually [`Step::Then`] and receive the
/// previous step's value; a `Start` in a later position ignores it.
pub enum Step<T, E> {
    /// Runs without an input
    Start(Task<T, E>),
    /// Consumes the previous step's value
    Then(Box<dyn FnOnce(T, Done<T, E>)>),
}

impl<T, E> Step<T, E> {
    /// A step that runs without an input
    pub fn start(body: impl FnOnce(Done<T, E>) + 'static) -> Self {
        Self::Start(Task::new(body))
    }

    /// A step that consumes the previous step's value
    pub fn then(body: impl FnOnce(T, Done<T, E>) + 'static) -> Self {
        Self::Then(Box::new(body))
    }

    /// Whether this step needs the previous step's value
    #[must_use]
    pub fn expects_input(&self) -> bool {
        matches!(self, Self::Then(_))
    }
}

impl<T, E> From<Task<T, E>> for Step<T, E> {
    fn from(task: Task<T, E>) -> Self {
        Self::Start(task)
    }
}

impl<T, E> fmt::Debug for Step<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(_) => f.write_str("Step::Start"),
            Self::Then(_) => f.write_str("Step::Then"),
        }
    }
}
