//! # Per-Tenant Locks
//!
//! Serializes check-then-write sequences (matrix edits, result replacement)
//! for one tenant while leaving other tenants uncontended.
//!
//! ## Invariant
//!
//! The `DashMap` shard guard is released before the tenant mutex is taken,
//! so waiting on one tenant never blocks lookups for another.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::identity::TenantId;

/// A table of mutexes keyed by tenant.
#[derive(Debug, Default)]
pub struct TenantLocks {
    locks: DashMap<TenantId, Arc<Mutex<()>>>,
}

impl TenantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `tenant`.
    pub fn with_lock<R>(&self, tenant: &TenantId, f: impl FnOnce() -> R) -> R {
        let mutex = self.mutex_for(tenant);
        let _guard = mutex.lock();
        f()
    }

    /// Number of tenants that have ever been locked.
    pub fn tenant_count(&self) -> usize {
        self.locks.len()
    }

    fn mutex_for(&self, tenant: &TenantId) -> Arc<Mutex<()>> {
        if let Some(existing) = self.locks.get(tenant) {
            return Arc::clone(existing.value());
        }
        Arc::clone(self.locks.entry(tenant.clone()).or_default().value())
    }
}
