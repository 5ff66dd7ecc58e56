//! # Tenant Context
//!
//! What the authentication boundary hands the engine for every call.

use serde::{Deserialize, Serialize};

use crate::identity::TenantId;
use crate::scale::PerformanceRatingScale;

/// The calling tenant and the rating scale it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub scale: PerformanceRatingScale,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId, scale: PerformanceRatingScale) -> Self {
        Self { tenant_id, scale }
    }

    /// Context for a tenant with no recorded scale preference.
    pub fn with_default_scale(tenant_id: TenantId) -> Self {
        Self::new(tenant_id, PerformanceRatingScale::default())
    }
}
