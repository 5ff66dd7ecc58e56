//! Engine errors.

use thiserror::Error;

use compa_core::{StorageError, ValidationError};
use compa_matrix::MatrixError;

use crate::batch::state::BatchLifecycleError;

/// Failures of a single-record calculation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    /// An input value is invalid. Nothing was looked up.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Matrix lookup failed, including `NoMatrixCell`.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

impl CalculationError {
    pub fn is_no_matrix_cell(&self) -> bool {
        matches!(self, Self::Matrix(MatrixError::NoMatrixCell { .. }))
    }
}

/// Failures that abort a whole batch.
///
/// Row-level problems are never reported here; they become
/// [`RowError`](crate::batch::RowError)s on the affected records.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The upload's shape or header is wrong. No row was processed.
    #[error("malformed upload: {reason}")]
    MalformedUpload {
        /// What is wrong with the upload.
        reason: String,
    },

    /// The upload has more data rows than the configured limit.
    #[error("upload has {count} data rows; the limit is {max}")]
    TooManyRows {
        /// Non-blank data rows found.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Storing the computed results failed. Previous results are intact.
    #[error("failed to persist batch results: {0}")]
    Persistence(#[from] StorageError),

    /// The worker pool could not be built.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),

    /// Internal lifecycle misuse.
    #[error(transparent)]
    Lifecycle(#[from] BatchLifecycleError),
}

impl BatchError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedUpload {
            reason: reason.into(),
        }
    }
}
