//! # compa-matrix: Adjustment Matrices
//!
//! An adjustment matrix is a tenant's rule table: for each performance bucket,
//! a set of compa-ratio bands, each carrying an increase percentage for
//! employees below and at-or-above the tenure threshold.
//!
//! ## Modules
//!
//! - [`row`]: matrix rows, compa-ratio ranges, band labels, row drafts.
//! - [`defaults`]: the 18-row table new tenants are seeded with.
//! - [`repository`]: the persistence boundary and an in-memory backend.
//! - [`store`]: [`AdjustmentMatrixStore`], lookup and overlap-safe editing.
//! - [`validation`]: [`MatrixValidationService`], advisory and blocking
//!   checks over a whole proposed matrix.
//!
//! ## Invariant
//!
//! Among the active rows of one tenant and bucket, no two ranges overlap
//! (`f1 < t2 && f2 < t1`). Touching endpoints are allowed. Every write path
//! in [`AdjustmentMatrixStore`] checks this while holding the tenant's lock.

pub mod defaults;
pub mod error;
pub mod repository;
pub mod row;
pub mod store;
pub mod validation;

pub use defaults::{default_drafts, DEFAULT_ROW_COUNT};
pub use error::MatrixError;
pub use repository::{InMemoryMatrixRepository, MatrixRepository};
pub use row::{AdjustmentMatrixRow, CompaRange, MatrixRowDraft, TENURE_THRESHOLD_YEARS};
pub use store::AdjustmentMatrixStore;
pub use validation::{IssueKind, MatrixIssue, MatrixValidationReport, MatrixValidationService};
