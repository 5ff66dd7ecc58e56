//! # Identity Newtypes
//!
//! Identifiers for tenants, matrix rows, and batch runs. Distinct types keep
//! a row id from being passed where a batch id is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IdentityError;

/// Opaque identifier of a client organization.
///
/// Supplied by the authentication boundary and trusted as-is. The only
/// construction rule is that it is not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant id, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityError::EmptyTenantId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TenantId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for an adjustment matrix row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixRowId(pub Uuid);

/// Unique identifier for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl MatrixRowId {
    /// Generate a new random row identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MatrixRowId {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchId {
    /// Generate a new random batch identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MatrixRowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "matrix-row:{}", self.0)
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "batch:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_trims() {
        let id = TenantId::new("  acme  ").unwrap();
        assert_eq!(id.as_str(), "acme");
        assert_eq!(id.to_string(), "acme");
    }

    #[test]
    fn test_tenant_id_rejects_blank() {
        assert_eq!(TenantId::new("   "), Err(IdentityError::EmptyTenantId));
        assert_eq!(TenantId::new(""), Err(IdentityError::EmptyTenantId));
    }

    #[test]
    fn test_tenant_id_serde_validates() {
        let id: TenantId = serde_json::from_str("\"acme\"").unwrap();
        assert_eq!(id.as_str(), "acme");
        assert!(serde_json::from_str::<TenantId>("\"  \"").is_err());
    }

    #[test]
    fn test_row_ids_are_unique() {
        assert_ne!(MatrixRowId::new(), MatrixRowId::new());
    }

    #[test]
    fn test_display_prefixes() {
        let row = MatrixRowId::new();
        let batch = BatchId::new();
        assert!(row.to_string().starts_with("matrix-row:"));
        assert!(batch.to_string().starts_with("batch:"));
        assert!(batch.to_string().ends_with(&batch.as_uuid().to_string()));
    }
}
