//! # Batch Run
//!
//! One upload processed end to end: identity, tenant, records in source
//! order, tallies, and the lifecycle log. Immutable once persisted.

use serde::{Deserialize, Serialize};

use compa_core::{BatchId, PerformanceRatingScale, TenantContext, TenantId, Timestamp};

use crate::batch::record::BatchRecord;
use crate::batch::state::{BatchLifecycle, BatchLifecycleError, BatchState, BatchTransitionRecord};

/// How an upload turned out, as shown in upload history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadOutcome {
    /// Every row computed.
    Completed,
    /// Some rows failed.
    Partial,
    /// No row computed.
    Failed,
}

impl std::fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Completed => "COMPLETED",
            Self::Partial => "PARTIAL",
            Self::Failed => "FAILED",
        })
    }
}

/// A processed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRun {
    pub batch_id: BatchId,
    pub tenant_id: TenantId,
    pub scale: PerformanceRatingScale,
    pub created_at: Timestamp,
    pub records: Vec<BatchRecord>,
    pub total: usize,
    pub success_count: usize,
    pub error_count: usize,
    lifecycle: BatchLifecycle,
}

impl BatchRun {
    /// A fresh run in ACCEPTED state.
    pub fn accept(ctx: &TenantContext) -> Self {
        Self {
            batch_id: BatchId::new(),
            tenant_id: ctx.tenant_id.clone(),
            scale: ctx.scale,
            created_at: Timestamp::now(),
            records: Vec::new(),
            total: 0,
            success_count: 0,
            error_count: 0,
            lifecycle: BatchLifecycle::default(),
        }
    }

    pub fn state(&self) -> BatchState {
        self.lifecycle.state
    }

    pub fn transitions(&self) -> &[BatchTransitionRecord] {
        &self.lifecycle.transitions
    }

    pub fn outcome(&self) -> UploadOutcome {
        if self.error_count == 0 {
            UploadOutcome::Completed
        } else if self.success_count == 0 {
            UploadOutcome::Failed
        } else {
            UploadOutcome::Partial
        }
    }

    /// Records that failed, in source order.
    pub fn failed_records(&self) -> impl Iterator<Item = &BatchRecord> {
        self.records.iter().filter(|r| !r.is_computed())
    }

    /// Records that computed, in source order.
    pub fn computed_records(&self) -> impl Iterator<Item = &BatchRecord> {
        self.records.iter().filter(|r| r.is_computed())
    }

    pub(crate) fn begin_validation(&mut self) -> Result<(), BatchLifecycleError> {
        self.lifecycle.begin_validation()
    }

    pub(crate) fn begin_computing(&mut self, rows: usize) -> Result<(), BatchLifecycleError> {
        self.lifecycle.begin_computing(rows)
    }

    /// Attach computed records and tally them.
    pub(crate) fn record(&mut self, records: Vec<BatchRecord>) {
        self.total = records.len();
        self.success_count = records.iter().filter(|r| r.is_computed()).count();
        self.error_count = self.total - self.success_count;
        self.records = records;
    }

    pub(crate) fn mark_persisted(&mut self) -> Result<(), BatchLifecycleError> {
        self.lifecycle.mark_persisted()
    }

    pub(crate) fn reject(&mut self, reason: &str) -> Result<(), BatchLifecycleError> {
        self.lifecycle.reject(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::record::{RawRow, RowError, RowOutcome};

    fn failed(row_index: usize) -> BatchRecord {
        BatchRecord {
            row_index,
            raw: RawRow::default(),
            outcome: RowOutcome::Failed {
                error: RowError::new(row_index, None, "bad"),
            },
        }
    }

    fn run() -> BatchRun {
        BatchRun::accept(&TenantContext::with_default_scale(TenantId::new("acme").unwrap()))
    }

    #[test]
    fn test_accept_starts_empty() {
        let run = run();
        assert_eq!(run.state(), BatchState::Accepted);
        assert_eq!(run.total, 0);
        assert_eq!(run.outcome(), UploadOutcome::Completed);
        assert!(run.transitions().is_empty());
    }

    #[test]
    fn test_all_failed_outcome() {
        let mut run = run();
        run.record(vec![failed(1), failed(2)]);
        assert_eq!(run.total, 2);
        assert_eq!(run.error_count, 2);
        assert_eq!(run.outcome(), UploadOutcome::Failed);
        assert_eq!(run.failed_records().count(), 2);
        assert_eq!(run.computed_records().count(), 0);
    }

    #[test]
    fn test_lifecycle_is_serialized_with_run() {
        let mut run = run();
        run.begin_validation().unwrap();
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["lifecycle"]["state"], "VALIDATING");
        let back: BatchRun = serde_json::from_value(json).unwrap();
        assert_eq!(back.state(), BatchState::Validating);
    }
}
