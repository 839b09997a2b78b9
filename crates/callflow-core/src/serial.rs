//! Sequential chaining with result passing
//!
//! Step `i + 1` starts only after step `i` completed, and receives its value.
//! The first error ends the chain. Like the parallel scheduler, the chain is
//! driven by a loop so steps that complete inline do not nest stack frames.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::FlowError;
use crate::task::{Done, Step, Task};

type OnFinished<T, E> = Box<dyn FnOnce(Result<Option<T>, FlowError<E>>)>;

struct SerialContext<T, E> {
    remaining: VecDeque<Step<T, E>>,
    /// Outcome of the step in flight, once it has completed
    outcome: Option<Result<T, E>>,
    started: bool,
    position: usize,
    driving: bool,
    on_finished: Option<OnFinished<T, E>>,
}

enum Action<T, E> {
    Launch(Task<T, E>),
    Feed(Box<dyn FnOnce(T, Done<T, E>)>, T),
    Wait,
    Finish(OnFinished<T, E>, Result<Option<T>, FlowError<E>>),
}

impl<T, E> SerialContext<T, E> {
    fn next_action(&mut self) -> Action<T, E> {
        if !self.started {
            self.started = true;
            return match self.remaining.pop_front() {
                Some(Step::Start(task)) => Action::Launch(task),
                Some(Step::Then(_)) => self.finish(Err(FlowError::InvalidArguments(
                    "the first step of a serial chain cannot expect an input".to_string(),
                ))),
                None => self.finish(Ok(None)),
            };
        }

        let Some(outcome) = self.outcome.take() else {
            return Action::Wait;
        };
        match outcome {
            Err(error) => {
                debug!(
                    "Serial step {} failed; skipping {} remaining",
                    self.position,
                    self.remaining.len()
                );
                self.finish(Err(FlowError::Task(error)))
            }
            Ok(value) => match self.remaining.pop_front() {
                None => self.finish(Ok(Some(value))),
                Some(step) => {
                    self.position += 1;
                    trace!("Starting serial step {}", self.position);
                    match step {
                        Step::Then(body) => Action::Feed(body, value),
                        Step::Start(task) => Action::Launch(task),
                    }
                }
            },
        }
    }

    fn finish(&mut self, result: Result<Option<T>, FlowError<E>>) -> Action<T, E> {
        match self.on_finished.take() {
            Some(on_finished) => Action::Finish(on_finished, result),
            None => Action::Wait,
        }
    }
}

/// Clears `driving` when the drive loop exits, also when a step panics
struct DriveGuard<'a, T, E>(&'a RefCell<SerialContext<T, E>>);

impl<T, E> Drop for DriveGuard<'_, T, E> {
    fn drop(&mut self) {
        self.0.borrow_mut().driving = false;
    }
}

fn drive<T: 'static, E: 'static>(ctx: &Rc<RefCell<SerialContext<T, E>>>) {
    {
        let mut state = ctx.borrow_mut();
        if state.driving {
            return;
        }
        state.driving = true;
    }
    let _guard = DriveGuard(ctx);

    loop {
        let action = ctx.borrow_mut().next_action();
        match action {
            Action::Launch(task) => task.run(continuation(ctx)),
            Action::Feed(body, value) => body(value, continuation(ctx)),
            Action::Wait => break,
            Action::Finish(on_finished, result) => {
                on_finished(result);
                break;
            }
        }
    }
}

fn continuation<T: 'static, E: 'static>(ctx: &Rc<RefCell<SerialContext<T, E>>>) -> Done<T, E> {
    let owner = Rc::clone(ctx);
    Done::new(move |outcome| {
        owner.borrow_mut().outcome = Some(outcome);
        drive(&owner);
    })
}

/// Run steps one after another, feeding each value into the next step
///
/// The callback receives the last step's value, `Ok(None)` for an empty chain,
/// [`FlowError::Task`] with the first error, or [`FlowError::InvalidArguments`]
/// when the first step is a [`Step::Then`].
///
/// A chain yields one value rather than a sequence, so an empty chain reports
/// the absence of that value as `Ok(None)`.
///
/// A panicking step unwinds out of the call that delivered the previous
/// completion. The chain does not advance past it and the callback never fires.
///
/// # Example
///
/// ```rust
/// use callflow_core::{serial, Step};
///
/// let steps: Vec<Step<u32, String>> = vec![
///     Step::start(|done| done.ok(1)),
///     Step::then(|prev, done| done.ok(prev + 1)),
/// ];
/// serial(steps, |outcome| assert_eq!(outcome, Ok(Some(2))));
/// ```
pub fn serial<T, E, F>(steps: Vec<Step<T, E>>, callback: F)
where
    T: 'static,
    E: 'static,
    F: FnOnce(Result<Option<T>, FlowError<E>>) + 'static,
{
    debug!("Starting serial chain of {} steps", steps.len());
    let ctx = Rc::new(RefCell::new(SerialContext {
        remaining: steps.into(),
        outcome: None,
        started: false,
        position: 0,
        driving: false,
        on_finished: Some(Box::new(callback)),
    }));
    drive(&ctx);
}
