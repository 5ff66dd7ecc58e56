//! Batch processing of uploaded employee rows.

pub mod processor;
pub mod record;
pub mod run;
pub mod state;

pub use processor::BatchProcessor;
pub use record::{BatchRecord, PendingRow, RawRow, RowError, RowOutcome, RowWarning};
pub use run::{BatchRun, UploadOutcome};
pub use state::{BatchLifecycleError, BatchState, BatchTransitionRecord, RowState};
