//! # compa-engine: Salary Adjustment Computation
//!
//! Turns employee records into salary adjustments using a tenant's
//! adjustment matrix.
//!
//! ## Paths
//!
//! - **Single record** ([`CompensationCalculator`]): validate, compute the
//!   compa-ratio, resolve the bucket and matrix band, apply the tenure
//!   percentage. A missing band is a hard [`MatrixError::NoMatrixCell`].
//!
//! - **Batch** ([`BatchProcessor`]): decode an uploaded sheet, compute every
//!   row on a bounded worker pool, isolate row failures, and atomically
//!   replace the tenant's stored results. A missing band yields a zero
//!   increase with a row warning instead of failing the row.
//!
//! ## Batch lifecycle
//!
//! ```text
//! Accepted ──▶ Validating ──▶ Computing ──▶ Persisted
//!                  │              │
//!                  └──▶ Rejected ◀┘
//! ```
//!
//! [`MatrixError::NoMatrixCell`]: compa_matrix::MatrixError::NoMatrixCell

pub mod batch;
pub mod calculator;
pub mod config;
pub mod error;
pub mod results;
pub mod upload;

pub use batch::{
    BatchProcessor, BatchRecord, BatchRun, BatchState, PendingRow, RawRow, RowError,
    RowOutcome, RowState, RowWarning, UploadOutcome,
};
pub use calculator::{
    CalculationInput, CalculationResult, CompensationCalculator, MissingCellPolicy,
};
pub use config::{ConfigError, EngineConfig};
pub use error::{BatchError, CalculationError};
pub use results::{InMemoryResultRepository, ResultRepository, StoredResult, UploadSummary};
pub use upload::{decode_sheet, encode_errors, encode_run, Sheet};
