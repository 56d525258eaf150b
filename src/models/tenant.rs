//! Tenant identity.
//!
//! Every record handled by the engine belongs to exactly one tenant
//! (company). The [`Tenanted`] trait lets the store check ownership
//! generically before handing a record to an engine operation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a tenant (company).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Records that are owned by a tenant.
pub trait Tenanted {
    /// The owning tenant.
    fn tenant_id(&self) -> &TenantId;
}
