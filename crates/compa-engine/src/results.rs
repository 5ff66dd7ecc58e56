//! # Stored Results
//!
//! The persistence boundary for batch output. Each tenant holds the
//! computed rows of its last persisted run, that run itself (failed rows
//! included, for error export), and a summary per persisted upload.
//!
//! `replace_for_tenant` must be atomic: readers see either the previous
//! run's rows or the new run's rows, never a mix.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use compa_core::{BatchId, StorageError, TenantId, Timestamp};

use crate::batch::{BatchRun, UploadOutcome};
use crate::calculator::{CalculationInput, CalculationResult};

/// One computed row as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResult {
    pub batch_id: BatchId,
    pub tenant_id: TenantId,
    pub row_index: usize,
    pub employee_code: String,
    pub employee_name: Option<String>,
    pub job_title: Option<String>,
    pub input: CalculationInput,
    pub result: CalculationResult,
}

/// Upload history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub batch_id: BatchId,
    pub created_at: Timestamp,
    pub total: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub outcome: UploadOutcome,
}

impl From<&BatchRun> for UploadSummary {
    fn from(run: &BatchRun) -> Self {
        Self {
            batch_id: run.batch_id,
            created_at: run.created_at,
            total: run.total,
            success_count: run.success_count,
            error_count: run.error_count,
            outcome: run.outcome(),
        }
    }
}

/// Storage for batch results.
pub trait ResultRepository: Send + Sync {
    /// Atomically replace every stored result of the tenant and record the
    /// run as the latest.
    fn replace_for_tenant(
        &self,
        tenant: &TenantId,
        results: Vec<StoredResult>,
        run: BatchRun,
    ) -> Result<(), StorageError>;

    /// Stored results in source row order.
    fn results_for_tenant(&self, tenant: &TenantId) -> Result<Vec<StoredResult>, StorageError>;

    fn latest_run(&self, tenant: &TenantId) -> Result<Option<BatchRun>, StorageError>;

    /// Summaries of persisted uploads, newest first.
    fn history(&self, tenant: &TenantId) -> Result<Vec<UploadSummary>, StorageError>;
}

#[derive(Debug, Default)]
struct TenantResults {
    results: Vec<StoredResult>,
    latest: Option<BatchRun>,
    history: Vec<UploadSummary>,
}

/// In-process backend keyed by tenant.
#[derive(Debug, Default)]
pub struct InMemoryResultRepository {
    tenants: DashMap<TenantId, TenantResults>,
}

impl InMemoryResultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultRepository for InMemoryResultRepository {
    fn replace_for_tenant(
        &self,
        tenant: &TenantId,
        results: Vec<StoredResult>,
        run: BatchRun,
    ) -> Result<(), StorageError> {
        if let Some(stray) = results.iter().find(|r| r.tenant_id != *tenant) {
            return Err(StorageError::Conflict(format!(
                "result for tenant {} cannot be stored under {tenant}",
                stray.tenant_id
            )));
        }
        let mut entry = self.tenants.entry(tenant.clone()).or_default();
        entry.history.insert(0, UploadSummary::from(&run));
        entry.results = results;
        entry.latest = Some(run);
        Ok(())
    }

    fn results_for_tenant(&self, tenant: &TenantId) -> Result<Vec<StoredResult>, StorageError> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|t| t.results.clone())
            .unwrap_or_default())
    }

    fn latest_run(&self, tenant: &TenantId) -> Result<Option<BatchRun>, StorageError> {
        Ok(self.tenants.get(tenant).and_then(|t| t.latest.clone()))
    }

    fn history(&self, tenant: &TenantId) -> Result<Vec<UploadSummary>, StorageError> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|t| t.history.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compa_core::TenantContext;

    fn tenant(name: &str) -> TenantId {
        TenantId::new(name).unwrap()
    }

    fn run(t: &TenantId) -> BatchRun {
        BatchRun::accept(&TenantContext::with_default_scale(t.clone()))
    }

    #[test]
    fn test_empty_tenant_reads() {
        let repo = InMemoryResultRepository::new();
        let t = tenant("acme");
        assert!(repo.results_for_tenant(&t).unwrap().is_empty());
        assert!(repo.latest_run(&t).unwrap().is_none());
        assert!(repo.history(&t).unwrap().is_empty());
    }

    #[test]
    fn test_history_newest_first() {
        let repo = InMemoryResultRepository::new();
        let t = tenant("acme");
        let first = run(&t);
        let second = run(&t);
        repo.replace_for_tenant(&t, vec![], first.clone()).unwrap();
        repo.replace_for_tenant(&t, vec![], second.clone()).unwrap();
        let history = repo.history(&t).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].batch_id, second.batch_id);
        assert_eq!(history[1].batch_id, first.batch_id);
        assert_eq!(repo.latest_run(&t).unwrap().unwrap().batch_id, second.batch_id);
    }

    #[test]
    fn test_tenants_are_isolated() {
        let repo = InMemoryResultRepository::new();
        let a = tenant("a");
        let b = tenant("b");
        repo.replace_for_tenant(&a, vec![], run(&a)).unwrap();
        assert!(repo.latest_run(&b).unwrap().is_none());
        assert!(repo.history(&b).unwrap().is_empty());
    }
}
