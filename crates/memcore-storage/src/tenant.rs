//! The tenant store (§4.1): provisioning plus the single `with_tenant`
//! primitive everything else is built on. Every other query module in
//! this crate takes a `&mut Tx` directly rather than opening its own
//! transaction — nested calls reuse the outer one, they never nest
//! `with_tenant` itself.

use std::future::Future;

use memcore_core::errors::StorageError;
use memcore_core::models::Tenant;
use memcore_core::{MemcoreError, MemcoreResult};
use sqlx::{PgPool, Postgres, Transaction};

use crate::{migrations, to_storage_err};

/// A transaction pinned to one tenant's search path for its lifetime.
pub type Tx<'a> = Transaction<'a, Postgres>;

#[derive(Clone)]
pub struct TenantStore {
    pool: PgPool,
}

impl TenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a brand-new tenant: insert the shared registry row and
    /// provision its schema from the fixed template (§4.1). Idempotent on
    /// the schema; the registry insert is `ON CONFLICT DO NOTHING` so a
    /// racing "first sign-in" doesn't error.
    #[tracing::instrument(skip(self))]
    pub async fn provision(&self, tenant_id: uuid::Uuid) -> MemcoreResult<Tenant> {
        let namespace = Tenant::namespace_for(tenant_id);
        sqlx::query(
            r#"INSERT INTO shared.tenants (id, namespace) VALUES ($1, $2)
               ON CONFLICT (id) DO NOTHING"#,
        )
        .bind(tenant_id)
        .bind(&namespace)
        .execute(&self.pool)
        .await
        .map_err(to_storage_err)?;

        migrations::provision_tenant_schema(&self.pool, &namespace)
            .await
            .map_err(to_storage_err)?;

        let row = sqlx::query_as::<_, (uuid::Uuid, String, chrono::DateTime<chrono::Utc>)>(
            "SELECT id, namespace, created_at FROM shared.tenants WHERE id = $1",
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(to_storage_err)?;

        Ok(Tenant {
            id: row.0,
            namespace: row.1,
            created_at: row.2,
        })
    }

    /// Every provisioned tenant id, used by process-wide sweeps (decay,
    /// nightly batch extraction) that have no other way to enumerate
    /// tenants (§4.4 decay scheduler, §9 batch-extraction scheduling).
    pub async fn list_all(&self) -> MemcoreResult<Vec<uuid::Uuid>> {
        let rows = sqlx::query_scalar::<_, uuid::Uuid>("SELECT id FROM shared.tenants")
            .fetch_all(&self.pool)
            .await
            .map_err(to_storage_err)?;
        Ok(rows)
    }

    async fn lookup_namespace(&self, tenant_id: uuid::Uuid) -> MemcoreResult<String> {
        sqlx::query_scalar::<_, String>("SELECT namespace FROM shared.tenants WHERE id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(to_storage_err)?
            .ok_or_else(|| {
                MemcoreError::Storage(StorageError::TenantNotFound {
                    tenant_id: tenant_id.to_string(),
                })
            })
    }

    /// Acquire a connection, pin the search path to `<tenant>, shared`,
    /// run `f` inside a transaction, commit on `Ok`, roll back on `Err`.
    /// This is the *only* way the rest of the codebase touches tenant
    /// data — every query module's functions take the `&mut Tx` this
    /// produces (§4.1, §5).
    pub async fn with_tenant<F, Fut, T>(&self, tenant_id: uuid::Uuid, f: F) -> MemcoreResult<T>
    where
        F: FnOnce(&mut Tx<'_>) -> Fut,
        Fut: Future<Output = MemcoreResult<T>>,
    {
        let namespace = self.lookup_namespace(tenant_id).await?;

        let mut tx = self.pool.begin().await.map_err(to_storage_err)?;

        // `SET LOCAL` scopes the search path to this transaction only —
        // safe to share one pool across concurrently-running tenants.
        sqlx::query(&format!(r#"SET LOCAL search_path TO "{namespace}", shared"#))
            .execute(&mut *tx)
            .await
            .map_err(to_storage_err)?;

        match f(&mut tx).await {
            Ok(value) => {
                tx.commit().await.map_err(to_storage_err)?;
                Ok(value)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }
}
