//! # Adjustment Matrix Store
//!
//! Tenant-scoped lookup and editing of matrix rows.
//!
//! ## Lookup
//!
//! Ranges are closed, and adjacent default bands share endpoints (1.01 and
//! 1.30). When a ratio sits exactly on a shared endpoint the row with the
//! lowest `compa_from` wins, so a lookup resolves to one row or none.
//!
//! ## Writes
//!
//! Every write is check-then-commit under the tenant's lock from
//! [`TenantLocks`]. Bulk replacement validates the whole incoming set
//! before a single atomic repository call, so a rejected replace leaves the
//! stored matrix untouched.

use std::sync::Arc;

use rust_decimal::Decimal;

use compa_core::{MatrixRowId, PerformanceBucket, TenantId, TenantLocks};

use crate::defaults::default_drafts;
use crate::error::MatrixError;
use crate::repository::{InMemoryMatrixRepository, MatrixRepository};
use crate::row::{first_overlap, AdjustmentMatrixRow, CompaRange, MatrixRowDraft};

/// Lookup and overlap-safe editing of adjustment matrices.
pub struct AdjustmentMatrixStore {
    repo: Arc<dyn MatrixRepository>,
    locks: TenantLocks,
}

impl std::fmt::Debug for AdjustmentMatrixStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdjustmentMatrixStore")
            .field("locked_tenants", &self.locks.tenant_count())
            .finish()
    }
}

impl AdjustmentMatrixStore {
    pub fn new(repo: Arc<dyn MatrixRepository>) -> Self {
        Self {
            repo,
            locks: TenantLocks::new(),
        }
    }

    /// A store backed by [`InMemoryMatrixRepository`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryMatrixRepository::new()))
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Resolve the active row whose range contains `ratio`.
    ///
    /// # Errors
    ///
    /// [`MatrixError::NoMatrixCell`] when the ratio falls in a gap or the
    /// bucket has no active rows.
    pub fn lookup(
        &self,
        tenant: &TenantId,
        bucket: PerformanceBucket,
        ratio: Decimal,
    ) -> Result<AdjustmentMatrixRow, MatrixError> {
        self.repo
            .list_bucket(tenant, bucket)?
            .into_iter()
            .filter(|row| row.active && row.range().contains(ratio))
            .min_by(|a, b| a.compa_from.cmp(&b.compa_from))
            .ok_or_else(|| MatrixError::NoMatrixCell {
                tenant: tenant.clone(),
                bucket,
                ratio,
            })
    }

    /// Active rows of the tenant, ordered by bucket (highest first) then range.
    pub fn list_active(&self, tenant: &TenantId) -> Result<Vec<AdjustmentMatrixRow>, MatrixError> {
        let mut rows: Vec<_> = self
            .repo
            .list(tenant)?
            .into_iter()
            .filter(|row| row.active)
            .collect();
        sort_for_display(&mut rows);
        Ok(rows)
    }

    /// Every row of the tenant, including inactive ones.
    pub fn list_all(&self, tenant: &TenantId) -> Result<Vec<AdjustmentMatrixRow>, MatrixError> {
        let mut rows = self.repo.list(tenant)?;
        sort_for_display(&mut rows);
        Ok(rows)
    }

    pub fn get_row(
        &self,
        tenant: &TenantId,
        id: &MatrixRowId,
    ) -> Result<AdjustmentMatrixRow, MatrixError> {
        self.repo
            .get(tenant, id)?
            .ok_or(MatrixError::RowNotFound { id: *id })
    }

    /// Whether the tenant has any rows at all.
    pub fn has_matrix(&self, tenant: &TenantId) -> Result<bool, MatrixError> {
        Ok(self.repo.count(tenant)? > 0)
    }

    /// Check `range` against the tenant's active rows in `bucket`.
    ///
    /// `excluding` skips the row being edited.
    pub fn validate_no_overlap(
        &self,
        tenant: &TenantId,
        bucket: PerformanceBucket,
        range: CompaRange,
        excluding: Option<&MatrixRowId>,
    ) -> Result<(), MatrixError> {
        let conflict = self
            .repo
            .list_bucket(tenant, bucket)?
            .into_iter()
            .filter(|row| row.active && Some(&row.id) != excluding)
            .find(|row| row.range().overlaps(&range));
        match conflict {
            Some(existing) => Err(MatrixError::OverlappingRange {
                bucket,
                range,
                existing: existing.range(),
            }),
            None => Ok(()),
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert the default 18-row table for a tenant with no rows.
    ///
    /// # Errors
    ///
    /// [`MatrixError::SeedAlreadyExists`] if the tenant already has any row.
    pub fn seed_defaults(&self, tenant: &TenantId) -> Result<Vec<AdjustmentMatrixRow>, MatrixError> {
        self.locks.with_lock(tenant, || {
            if self.repo.count(tenant)? > 0 {
                return Err(MatrixError::SeedAlreadyExists {
                    tenant: tenant.clone(),
                });
            }
            let rows: Vec<_> = default_drafts()
                .into_iter()
                .map(|draft| draft.into_row(tenant.clone()))
                .collect();
            self.repo.replace_all(tenant, rows.clone())?;
            tracing::info!(tenant = %tenant, rows = rows.len(), "seeded default adjustment matrix");
            Ok(rows)
        })
    }

    /// Seed the defaults unless the tenant already has rows.
    pub fn ensure_seeded(&self, tenant: &TenantId) -> Result<(), MatrixError> {
        match self.seed_defaults(tenant) {
            Ok(_) | Err(MatrixError::SeedAlreadyExists { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Add a new active row.
    pub fn create_row(
        &self,
        tenant: &TenantId,
        draft: MatrixRowDraft,
    ) -> Result<AdjustmentMatrixRow, MatrixError> {
        draft.validate()?;
        self.locks.with_lock(tenant, || {
            self.validate_no_overlap(tenant, draft.bucket, draft.range(), None)?;
            let row = draft.into_row(tenant.clone());
            self.repo.insert(row.clone())?;
            tracing::info!(tenant = %tenant, row = %row.id, bucket = %row.bucket, range = %row.range(), "created matrix row");
            Ok(row)
        })
    }

    /// Replace the values of an existing row, keeping its id and active flag.
    pub fn update_row(
        &self,
        tenant: &TenantId,
        id: &MatrixRowId,
        draft: MatrixRowDraft,
    ) -> Result<AdjustmentMatrixRow, MatrixError> {
        draft.validate()?;
        self.locks.with_lock(tenant, || {
            let existing = self.get_row(tenant, id)?;
            if existing.active {
                self.validate_no_overlap(tenant, draft.bucket, draft.range(), Some(id))?;
            }
            let mut row = draft.into_row_with_id(tenant.clone(), *id);
            row.active = existing.active;
            if !self.repo.update(row.clone())? {
                return Err(MatrixError::RowNotFound { id: *id });
            }
            tracing::info!(tenant = %tenant, row = %id, range = %row.range(), "updated matrix row");
            Ok(row)
        })
    }

    /// Remove a row.
    ///
    /// # Errors
    ///
    /// [`MatrixError::LastRowForBucket`] if it is the bucket's only active row.
    pub fn delete_row(&self, tenant: &TenantId, id: &MatrixRowId) -> Result<(), MatrixError> {
        self.locks.with_lock(tenant, || {
            let row = self.get_row(tenant, id)?;
            if row.active {
                let active_in_bucket = self
                    .repo
                    .list_bucket(tenant, row.bucket)?
                    .iter()
                    .filter(|r| r.active)
                    .count();
                if active_in_bucket <= 1 {
                    return Err(MatrixError::LastRowForBucket { bucket: row.bucket });
                }
            }
            if !self.repo.delete(tenant, id)? {
                return Err(MatrixError::RowNotFound { id: *id });
            }
            tracing::info!(tenant = %tenant, row = %id, bucket = %row.bucket, "deleted matrix row");
            Ok(())
        })
    }

    /// Atomically replace the tenant's whole matrix.
    ///
    /// Every draft is validated and the full set is checked pairwise for
    /// overlap before anything is written.
    pub fn replace_all(
        &self,
        tenant: &TenantId,
        drafts: Vec<MatrixRowDraft>,
    ) -> Result<Vec<AdjustmentMatrixRow>, MatrixError> {
        for draft in &drafts {
            draft.validate()?;
        }
        let ranges: Vec<_> = drafts.iter().map(|d| (d.bucket, d.range())).collect();
        if let Some((bucket, range, existing)) = first_overlap(&ranges) {
            return Err(MatrixError::OverlappingRange {
                bucket,
                range,
                existing,
            });
        }
        let rows: Vec<_> = drafts
            .into_iter()
            .map(|draft| draft.into_row(tenant.clone()))
            .collect();
        self.locks.with_lock(tenant, || {
            self.repo.replace_all(tenant, rows.clone())?;
            tracing::info!(tenant = %tenant, rows = rows.len(), "replaced adjustment matrix");
            Ok(rows)
        })
    }

    /// Discard the tenant's rows and restore the default table.
    pub fn reset_to_default(
        &self,
        tenant: &TenantId,
    ) -> Result<Vec<AdjustmentMatrixRow>, MatrixError> {
        tracing::warn!(tenant = %tenant, "resetting adjustment matrix to defaults");
        self.replace_all(tenant, default_drafts())
    }
}

fn sort_for_display(rows: &mut [AdjustmentMatrixRow]) {
    rows.sort_by(|a, b| {
        b.bucket
            .cmp(&a.bucket)
            .then_with(|| a.compa_from.cmp(&b.compa_from))
    });
}
