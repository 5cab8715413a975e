//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::ExamKey;
use storage::repository::StorageError;

/// Errors emitted while constructing a working set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("exam {0} not found")]
    NotFound(ExamKey),

    #[error("training access required")]
    AuthRequired,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by a running session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The selection does not reference an option of the current question,
    /// or there is no current question at the cursor.
    #[error("selection {selected} is not a valid option for the current question")]
    InvalidSelection { selected: u8 },

    /// Navigation past either end of the working set. Non-fatal; callers
    /// ignore it.
    #[error("cursor already at the working-set boundary")]
    Boundary,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
