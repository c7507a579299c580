//! Tier metering (§3, §4.12). Usage counters live in `shared.usage_counters`
//! since a tier cap is a property of the account, not of one tenant
//! namespace; the advisory lock guarding `with_tier_limit_lock` is keyed
//! off `(tenant_id, resource)` so unrelated resources never contend.

use chrono::NaiveDate;
use memcore_core::{MemcoreError, MemcoreResult};
use sqlx::{PgPool, Row as _};
use std::future::Future;

use crate::to_storage_err;

pub async fn get_count(
    pool: &PgPool,
    tenant_id: uuid::Uuid,
    resource: &str,
    agent_id: &str,
    day: NaiveDate,
) -> MemcoreResult<i64> {
    let row = sqlx::query(
        "SELECT count FROM shared.usage_counters \
         WHERE tenant_id = $1 AND resource = $2 AND agent_id = $3 AND day = $4",
    )
    .bind(tenant_id)
    .bind(resource)
    .bind(agent_id)
    .bind(day)
    .fetch_optional(pool)
    .await
    .map_err(to_storage_err)?;

    match row {
        Some(r) => r.try_get("count").map_err(to_storage_err),
        None => Ok(0),
    }
}

/// Increment the buffered usage counter by `by` and return the new total.
/// Called from the periodic flush timer (§4.12), never per-request.
pub async fn increment_count(
    pool: &PgPool,
    tenant_id: uuid::Uuid,
    resource: &str,
    agent_id: &str,
    day: NaiveDate,
    by: i64,
) -> MemcoreResult<i64> {
    let row = sqlx::query(
        "INSERT INTO shared.usage_counters (tenant_id, resource, agent_id, day, count) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (tenant_id, resource, agent_id, day) \
         DO UPDATE SET count = shared.usage_counters.count + $5 \
         RETURNING count",
    )
    .bind(tenant_id)
    .bind(resource)
    .bind(agent_id)
    .bind(day)
    .bind(by)
    .fetch_one(pool)
    .await
    .map_err(to_storage_err)?;

    row.try_get("count").map_err(to_storage_err)
}

/// A quick, non-locking check: is `current + by` still under `limit`?
/// Used on the hot path where an occasional over-admit under race is
/// acceptable (§4.12 `softCheck`) — `with_tier_limit_lock` is for the
/// paths that aren't.
pub async fn soft_check(
    pool: &PgPool,
    tenant_id: uuid::Uuid,
    resource: &str,
    agent_id: &str,
    day: NaiveDate,
    by: i64,
    limit: i64,
) -> MemcoreResult<bool> {
    let current = get_count(pool, tenant_id, resource, agent_id, day).await?;
    Ok(current + by <= limit)
}

/// Hold a transaction-scoped Postgres advisory lock keyed on
/// `(tenant_id, resource)` for the duration of `f`, so a caller can check
/// the counter and increment it atomically with respect to every other
/// caller using the same key (§4.12 `withTierLimitLock`). Runs inside the
/// caller's already tenant-pinned transaction rather than opening a second
/// one — entity/table creation inside `f` needs the search path `SET
/// LOCAL` by `TenantStore::with_tenant` already in scope, and the
/// transactional advisory lock is released on that same transaction's
/// commit or rollback either way.
pub async fn with_tier_limit_lock<F, Fut, T>(
    tx: &mut crate::tenant::Tx<'_>,
    tenant_id: uuid::Uuid,
    resource: &str,
    f: F,
) -> MemcoreResult<T>
where
    F: FnOnce(&mut crate::tenant::Tx<'_>) -> Fut,
    Fut: Future<Output = MemcoreResult<T>>,
{
    let key = format!("{tenant_id}:{resource}");
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(&key)
        .execute(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    f(tx).await
}

pub async fn get_tier(pool: &PgPool, tenant_id: uuid::Uuid, agent_id: &str) -> MemcoreResult<String> {
    let row = sqlx::query(
        "SELECT tier FROM shared.api_keys \
         WHERE tenant_id = $1 AND agent_id = $2 AND revoked_at IS NULL \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(tenant_id)
    .bind(agent_id)
    .fetch_optional(pool)
    .await
    .map_err(to_storage_err)?;

    match row {
        Some(r) => r.try_get("tier").map_err(to_storage_err),
        None => Err(MemcoreError::NotFound {
            kind: "api_key".into(),
            id: format!("{tenant_id}:{agent_id}"),
        }),
    }
}
