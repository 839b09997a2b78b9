//! Error handling and types

use std::any::Any;

use thiserror::Error;

/// Errors surfaced by the combinators to their final callback
///
/// Task-reported errors are carried through unchanged in [`FlowError::Task`], so a
/// caller can always tell an argument-shape problem apart from a failure of one of
/// its own tasks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError<E> {
    /// The input does not have the shape the combinator requires
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A task completed its handle with an error
    #[error("Task failed: {0}")]
    Task(E),

    /// The final callback was dropped without ever being invoked
    ///
    /// Happens when some task drops its completion handle instead of completing it.
    #[error("Combinator abandoned: a completion handle was dropped without being invoked")]
    Abandoned,
}

impl<E> FlowError<E> {
    /// Returns the task error, if this is one
    #[must_use]
    pub fn into_task_error(self) -> Option<E> {
        match self {
            Self::Task(error) => Some(error),
            _ => None,
        }
    }
}

/// A panic caught while running a synchronous function inside a task
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Task panicked: {message}")]
pub struct TaskPanic {
    message: String,
}

impl TaskPanic {
    /// Build from the payload returned by `std::panic::catch_unwind`
    #[must_use]
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }

    /// The panic message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T, E> = std::result::Result<T, FlowError<E>>;
