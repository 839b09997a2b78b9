//! Bounded-concurrency scheduler
//!
//! [`parallel`] launches tasks in index order while keeping at most `window`
//! of them in flight. A completion frees a slot, which is refilled with the next
//! pending task. Failures never stop the schedule: every task runs, the first
//! error is kept, and results stay aligned with the task indices.
//!
//! # Reentrancy
//!
//! A task may complete its handle before it returns. The completion then only
//! records its bookkeeping; the launch loop that is already running picks the
//! freed slot up on its next iteration. This keeps the counters consistent and
//! bounds stack depth no matter how many tasks complete inline.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::mem;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::concurrency::Concurrency;
use crate::task::{Done, Task};

/// Outcome of a [`parallel`] or [`map`](crate::map) run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled<T, E> {
    /// The first error reported by any task
    pub error: Option<E>,
    /// One slot per task, `None` where the task failed
    pub results: Vec<Option<T>>,
}

impl<T, E> Settled<T, E> {
    /// No error and no results
    #[must_use]
    pub fn empty() -> Self {
        Self {
            error: None,
            results: Vec::new(),
        }
    }

    /// Whether every task succeeded
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Number of tasks that produced a value
    #[must_use]
    pub fn successes(&self) -> usize {
        self.results.iter().filter(|slot| slot.is_some()).count()
    }

    /// Collapse into the first error, or all values in task order
    ///
    /// # Errors
    ///
    /// Returns the first task error if any task failed.
    pub fn into_result(self) -> Result<Vec<T>, E> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.results.into_iter().flatten().collect()),
        }
    }
}

type OnSettled<T, E> = Box<dyn FnOnce(Settled<T, E>)>;

/// Per-invocation scheduler state
struct ExecutionContext<T, E> {
    /// Tasks not yet launched, front is `next_index`
    pending: VecDeque<Task<T, E>>,
    results: Vec<Option<T>>,
    first_error: Option<E>,
    next_index: usize,
    in_flight: usize,
    completed: usize,
    total: usize,
    window: usize,
    peak_in_flight: usize,
    /// Set while the launch loop runs; completions arriving inline only record
    launching: bool,
    on_settled: Option<OnSettled<T, E>>,
}

impl<T, E> ExecutionContext<T, E> {
    fn next_launch(&mut self) -> Option<(usize, Task<T, E>)> {
        if self.in_flight >= self.window {
            return None;
        }
        let task = self.pending.pop_front()?;
        let index = self.next_index;
        self.next_index += 1;
        self.in_flight += 1;
        self.peak_in_flight = self.peak_in_flight.max(self.in_flight);
        Some((index, task))
    }

    fn record(&mut self, index: usize, outcome: Result<T, E>) {
        self.in_flight -= 1;
        self.completed += 1;
        match outcome {
            Ok(value) => {
                trace!("Task {} done ({}/{})", index, self.completed, self.total);
                self.results[index] = Some(value);
            }
            Err(error) => {
                if self.first_error.is_none() {
                    debug!("Task {} failed; recording as first error", index);
                    self.first_error = Some(error);
                } else {
                    trace!("Task {} failed after an earlier error", index);
                }
            }
        }
    }

    fn take_settled(&mut self) -> Option<(OnSettled<T, E>, Settled<T, E>)> {
        if self.completed < self.total {
            return None;
        }
        let on_settled = self.on_settled.take()?;
        debug!(
            "Parallel run settled: {} tasks, peak in flight {}, failed: {}",
            self.total,
            self.peak_in_flight,
            self.first_error.is_some()
        );
        let settled = Settled {
            error: self.first_error.take(),
            results: mem::take(&mut self.results),
        };
        Some((on_settled, settled))
    }
}

/// Clears `launching` when the launch loop exits, also when a task panics
struct LaunchGuard<'a, T, E>(&'a RefCell<ExecutionContext<T, E>>);

impl<T, E> Drop for LaunchGuard<'_, T, E> {
    fn drop(&mut self) {
        self.0.borrow_mut().launching = false;
    }
}

/// Fill the window, then settle if everything has completed
///
/// No borrow of the context is held while a task or the final callback runs.
fn pump<T: 'static, E: 'static>(ctx: &Rc<RefCell<ExecutionContext<T, E>>>) {
    {
        let mut state = ctx.borrow_mut();
        if state.launching {
            return;
        }
        state.launching = true;
    }
    let guard = LaunchGuard(ctx);

    loop {
        let next = ctx.borrow_mut().next_launch();
        let Some((index, task)) = next else {
            break;
        };
        trace!("Launching task {}", index);
        let owner = Rc::clone(ctx);
        task.run(Done::new(move |outcome| {
            owner.borrow_mut().record(index, outcome);
            pump(&owner);
        }));
    }

    drop(guard);
    let settled = ctx.borrow_mut().take_settled();
    if let Some((on_settled, settled)) = settled {
        on_settled(settled);
    }
}

/// Run every task with no concurrency cap
///
/// Equivalent to [`parallel_with`] using [`Concurrency::Unbounded`].
///
/// # Example
///
/// ```rust
/// use callflow_core::{parallel, Task};
///
/// let tasks: Vec<Task<u32, String>> = vec![
///     Task::new(|done| done.err("first failed".to_string())),
///     Task::new(|done| done.ok(2)),
/// ];
/// parallel(tasks, |settled| {
///     assert_eq!(settled.error.as_deref(), Some("first failed"));
///     assert_eq!(settled.results, vec![None, Some(2)]);
/// });
/// ```
pub fn parallel<T, E, F>(tasks: Vec<Task<T, E>>, callback: F)
where
    T: 'static,
    E: 'static,
    F: FnOnce(Settled<T, E>) + 'static,
{
    parallel_with(tasks, Concurrency::Unbounded, callback);
}

/// Run tasks keeping at most `limit` in flight
///
/// A `limit` of `0` settles immediately without invoking any task.
pub fn parallel_limit<T, E, F>(tasks: Vec<Task<T, E>>, limit: usize, callback: F)
where
    T: 'static,
    E: 'static,
    F: FnOnce(Settled<T, E>) + 'static,
{
    parallel_with(tasks, Concurrency::Limit(limit), callback);
}

/// Run tasks under the given concurrency window
///
/// # Arguments
///
/// * `tasks` - Tasks in launch order; result slots follow the same order
/// * `concurrency` - Window size, resolved against `tasks.len()`
/// * `callback` - Invoked exactly once, after every launched task completed
///
/// The callback fires synchronously, before this function returns, when the
/// list is empty, when the window is `0`, or when every task completes inline.
pub fn parallel_with<T, E, F>(tasks: Vec<Task<T, E>>, concurrency: Concurrency, callback: F)
where
    T: 'static,
    E: 'static,
    F: FnOnce(Settled<T, E>) + 'static,
{
    let total = tasks.len();
    let window = concurrency.window(total);
    if total == 0 || window == 0 {
        debug!(
            "Parallel run has nothing to launch ({} tasks, window {})",
            total, window
        );
        callback(Settled::empty());
        return;
    }

    debug!("Starting parallel run: {} tasks, window {}", total, window);
    let ctx = Rc::new(RefCell::new(ExecutionContext {
        pending: tasks.into(),
        results: (0..total).map(|_| None).collect(),
        first_error: None,
        next_index: 0,
        in_flight: 0,
        completed: 0,
        total,
        window,
        peak_in_flight: 0,
        launching: false,
        on_settled: Some(Box::new(callback)),
    }));
    pump(&ctx);
}
