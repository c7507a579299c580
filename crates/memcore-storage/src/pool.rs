use std::time::Duration;

use memcore_core::config::StorageConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Build the shared connection pool. One pool serves every tenant;
/// per-request isolation comes from `TenantStore::with_tenant` pinning the
/// search path inside a transaction, not from separate pools (§5).
pub async fn build_pool(config: &StorageConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.database_url)
        .await
}
