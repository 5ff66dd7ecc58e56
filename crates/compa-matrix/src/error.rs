//! Matrix errors.

use rust_decimal::Decimal;
use thiserror::Error;

use compa_core::{MatrixRowId, PerformanceBucket, StorageError, TenantId};

use crate::row::CompaRange;

/// Errors from matrix lookup and editing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// No active row of the bucket contains the ratio.
    #[error("no matrix cell for tenant {tenant}, bucket {bucket}, compa-ratio {ratio}")]
    NoMatrixCell {
        /// Tenant that was searched.
        tenant: TenantId,
        /// Bucket that was searched.
        bucket: PerformanceBucket,
        /// The compa-ratio with no matching band.
        ratio: Decimal,
    },

    /// A range would overlap an existing active range in the same bucket.
    #[error("compa-ratio range {range} overlaps existing range {existing} in performance bucket {bucket}")]
    OverlappingRange {
        /// Bucket of both ranges.
        bucket: PerformanceBucket,
        /// The range being written.
        range: CompaRange,
        /// The range it collides with.
        existing: CompaRange,
    },

    /// Deleting the row would leave its bucket empty.
    #[error("cannot delete the last matrix for performance bucket {bucket}; each bucket must keep at least one row")]
    LastRowForBucket {
        /// Bucket that would become empty.
        bucket: PerformanceBucket,
    },

    /// Seeding was requested for a tenant that already has rows.
    #[error("tenant {tenant} already has an adjustment matrix")]
    SeedAlreadyExists {
        /// Tenant that already has rows.
        tenant: TenantId,
    },

    /// The row does not exist for this tenant.
    #[error("matrix row {id} not found")]
    RowNotFound {
        /// Requested id.
        id: MatrixRowId,
    },

    /// The row's own values are invalid.
    #[error("invalid matrix row: {field} {message}")]
    InvalidRow {
        /// Offending field name.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// The persistence backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
