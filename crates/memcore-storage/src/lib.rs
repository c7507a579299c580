//! # memcore-storage
//!
//! Postgres persistence layer for the memory store. Implements the tenant
//! store (§4.1), the read-only SQL sandbox (§4.2), schema migrations, and
//! the CRUD query modules every higher-level crate builds on.
//!
//! Single pool shared across all tenants; isolation is structural — every
//! session pins its search path to `<tenant_namespace>, shared` before the
//! first query (§4.1, §5).

pub mod codec;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod sandbox;
pub mod tenant;

pub use pool::build_pool;
pub use sandbox::{validate_sandbox_query, SandboxRequest, ValidatedQuery};
pub use tenant::TenantStore;

/// Convert a `sqlx::Error` into the crate-wide storage error.
pub fn to_storage_err(e: sqlx::Error) -> memcore_core::MemcoreError {
    memcore_core::MemcoreError::Storage(memcore_core::errors::StorageError::Database(
        e.to_string(),
    ))
}
