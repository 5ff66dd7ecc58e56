//! # Matrix Repository
//!
//! The persistence boundary for matrix rows. Backends only store and fetch.
//! Overlap rules, seeding policy, and locking live in
//! [`AdjustmentMatrixStore`](crate::store::AdjustmentMatrixStore).
//!
//! [`InMemoryMatrixRepository`] keeps each tenant's rows in one `DashMap`
//! entry, so `replace_all` swaps the whole set in a single write.

use dashmap::DashMap;

use compa_core::{MatrixRowId, PerformanceBucket, StorageError, TenantId};

use crate::row::AdjustmentMatrixRow;

/// Storage for adjustment matrix rows.
pub trait MatrixRepository: Send + Sync {
    /// All rows of the tenant, active or not, in insertion order.
    fn list(&self, tenant: &TenantId) -> Result<Vec<AdjustmentMatrixRow>, StorageError>;

    /// All rows of the tenant and bucket.
    fn list_bucket(
        &self,
        tenant: &TenantId,
        bucket: PerformanceBucket,
    ) -> Result<Vec<AdjustmentMatrixRow>, StorageError> {
        Ok(self
            .list(tenant)?
            .into_iter()
            .filter(|row| row.bucket == bucket)
            .collect())
    }

    fn get(
        &self,
        tenant: &TenantId,
        id: &MatrixRowId,
    ) -> Result<Option<AdjustmentMatrixRow>, StorageError>;

    fn count(&self, tenant: &TenantId) -> Result<usize, StorageError> {
        Ok(self.list(tenant)?.len())
    }

    fn insert(&self, row: AdjustmentMatrixRow) -> Result<(), StorageError>;

    /// Overwrite the row with the same id. Returns `false` if it was absent.
    fn update(&self, row: AdjustmentMatrixRow) -> Result<bool, StorageError>;

    /// Remove a row. Returns `false` if it was absent.
    fn delete(&self, tenant: &TenantId, id: &MatrixRowId) -> Result<bool, StorageError>;

    /// Atomically replace every row of the tenant.
    fn replace_all(
        &self,
        tenant: &TenantId,
        rows: Vec<AdjustmentMatrixRow>,
    ) -> Result<(), StorageError>;
}

/// In-process backend keyed by tenant.
#[derive(Debug, Default)]
pub struct InMemoryMatrixRepository {
    rows: DashMap<TenantId, Vec<AdjustmentMatrixRow>>,
}

impl InMemoryMatrixRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatrixRepository for InMemoryMatrixRepository {
    fn list(&self, tenant: &TenantId) -> Result<Vec<AdjustmentMatrixRow>, StorageError> {
        Ok(self
            .rows
            .get(tenant)
            .map(|rows| rows.value().clone())
            .unwrap_or_default())
    }

    fn get(
        &self,
        tenant: &TenantId,
        id: &MatrixRowId,
    ) -> Result<Option<AdjustmentMatrixRow>, StorageError> {
        Ok(self
            .rows
            .get(tenant)
            .and_then(|rows| rows.iter().find(|row| row.id == *id).cloned()))
    }

    fn count(&self, tenant: &TenantId) -> Result<usize, StorageError> {
        Ok(self.rows.get(tenant).map(|rows| rows.len()).unwrap_or(0))
    }

    fn insert(&self, row: AdjustmentMatrixRow) -> Result<(), StorageError> {
        self.rows.entry(row.tenant_id.clone()).or_default().push(row);
        Ok(())
    }

    fn update(&self, row: AdjustmentMatrixRow) -> Result<bool, StorageError> {
        let Some(mut rows) = self.rows.get_mut(&row.tenant_id) else {
            return Ok(false);
        };
        match rows.iter_mut().find(|existing| existing.id == row.id) {
            Some(slot) => {
                *slot = row;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, tenant: &TenantId, id: &MatrixRowId) -> Result<bool, StorageError> {
        let Some(mut rows) = self.rows.get_mut(tenant) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| row.id != *id);
        Ok(rows.len() != before)
    }

    fn replace_all(
        &self,
        tenant: &TenantId,
        rows: Vec<AdjustmentMatrixRow>,
    ) -> Result<(), StorageError> {
        self.rows.insert(tenant.clone(), rows);
        Ok(())
    }
}
