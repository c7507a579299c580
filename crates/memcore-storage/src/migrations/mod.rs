//! Fixed schema templates (§4.1, §3). `SHARED_SCHEMA_SQL` runs once at
//! process start against the `shared` namespace; `TENANT_SCHEMA_TEMPLATE`
//! runs once per tenant the first time it signs in.

mod shared;
mod tenant_template;

pub use shared::SHARED_SCHEMA_SQL;
pub use tenant_template::tenant_schema_sql;

use sqlx::PgPool;

/// Idempotently create the shared namespace and its tables. Safe to call
/// on every process start (teacher-style "CREATE TABLE IF NOT EXISTS").
pub async fn apply_shared_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(SHARED_SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

/// Provision a brand-new tenant namespace (§4.1): create the schema and
/// every standard table from the fixed template. Idempotent — a tenant
/// that already has a schema is a no-op thanks to `IF NOT EXISTS`.
pub async fn provision_tenant_schema(
    pool: &PgPool,
    namespace: &str,
) -> Result<(), sqlx::Error> {
    let sql = tenant_schema_sql(namespace);
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}
