//! Errors reported by [`AsyncTask`](crate::AsyncTask) handles.

use thiserror::Error;

/// Why an [`AsyncTask`](crate::AsyncTask) finished without a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task was cancelled through [`AsyncTask::abort`](crate::AsyncTask::abort)
    /// or by runtime shutdown.
    #[error("task was aborted before completing")]
    Aborted,

    /// The task panicked.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The task went away without reporting how.
    #[error("task dropped without producing a value")]
    Dropped,
}
