//! Task errors.

use std::sync::Arc;

use strand_core::BoxError;
use thiserror::Error;

/// Shared form of a body error, so a failure can be handed to every awaiter.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Why a task has no value to give.
///
/// Cloning is cheap; a failed task hands a clone of the same error to each
/// awaiter and to every `catching` continuation.
#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    /// The task body returned an error.
    #[error("task failed: {0}")]
    Failed(#[source] SharedError),

    /// The task body panicked.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The result was read before the task finished.
    #[error("task has not completed")]
    NotCompleted,

    /// The successful value was already taken by an earlier read or await.
    #[error("task result already consumed")]
    Consumed,
}

impl TaskError {
    /// Wrap any error as a task failure.
    pub fn failed(err: impl Into<BoxError>) -> Self {
        let err: BoxError = err.into();
        Self::Failed(Arc::from(err))
    }

    /// Unwrap a boxed body error. A `TaskError` propagated out of an awaited
    /// inner task with `?` comes back as itself rather than nested.
    pub(crate) fn from_body(err: BoxError) -> Self {
        match err.downcast::<TaskError>() {
            Ok(task_err) => *task_err,
            Err(other) => Self::Failed(Arc::from(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_task_errors_are_not_nested() {
        let boxed: BoxError = Box::new(TaskError::Panicked("inner".into()));
        assert!(matches!(TaskError::from_body(boxed), TaskError::Panicked(m) if m == "inner"));

        let boxed: BoxError = "disk full".into();
        let err = TaskError::from_body(boxed);
        assert_eq!(err.to_string(), "task failed: disk full");
    }

    #[test]
    fn clones_share_the_body_error() {
        let err = TaskError::failed("socket closed");
        let again = err.clone();
        match (err, again) {
            (TaskError::Failed(a), TaskError::Failed(b)) => assert!(Arc::ptr_eq(&a, &b)),
            other => panic!("expected two Failed, got {other:?}"),
        }
    }
}
