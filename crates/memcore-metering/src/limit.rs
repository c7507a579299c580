//! `withTierLimitLock` call sites (§4.12): resolve the caller's tier, take
//! the advisory lock inside the ambient tenant-pinned transaction, recount,
//! and either run `f` or raise `TierLimit`.

use std::future::Future;

use chrono::Utc;
use memcore_core::config::MeteringConfig;
use memcore_core::{MemcoreError, MemcoreResult};
use memcore_storage::queries::metering_ops;
use memcore_storage::tenant::Tx;
use sqlx::PgPool;

/// Which per-tier cap a call site is enforcing. Maps 1:1 onto
/// `TierLimits`'s fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeteredResource {
    Tables,
    Agents,
    GraphEntities,
}

impl MeteredResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeteredResource::Tables => "tables",
            MeteredResource::Agents => "agents",
            MeteredResource::GraphEntities => "graphEntities",
        }
    }

    fn limit(&self, config: &MeteringConfig, tier: &str) -> i64 {
        let limits = config.limits_for(tier);
        match self {
            MeteredResource::Tables => limits.tables,
            MeteredResource::Agents => limits.agents,
            MeteredResource::GraphEntities => limits.graph_entities,
        }
    }
}

/// Run `f` inside the advisory-lock-guarded section of the caller's
/// tenant-pinned transaction, raising `TierLimit` first if `current_count`
/// (supplied by the caller, since each resource is counted a different
/// way — rows in a table, distinct agents, live entities) is already at
/// cap.
pub async fn with_tier_limit_lock<F, Fut, T>(
    tx: &mut Tx<'_>,
    config: &MeteringConfig,
    tenant_id: uuid::Uuid,
    tier: &str,
    resource: MeteredResource,
    current_count: i64,
    f: F,
) -> MemcoreResult<T>
where
    F: FnOnce(&mut Tx<'_>) -> Fut,
    Fut: Future<Output = MemcoreResult<T>>,
{
    let limit = resource.limit(config, tier);

    metering_ops::with_tier_limit_lock(tx, tenant_id, resource.as_str(), |tx| async move {
        if memcore_core::config::TierLimits::at_cap(limit, current_count) {
            return Err(MemcoreError::TierLimit {
                resource: resource.as_str().to_string(),
                current: current_count,
                limit,
            });
        }
        f(tx).await
    })
    .await
}

/// The non-locking §4.12 `softCheck` variant for background tasks that
/// can tolerate an occasional race. Reads the buffered dashboard counter,
/// not a live recount — callers needing a hard guarantee use
/// `with_tier_limit_lock` instead.
pub async fn soft_check(
    pool: &PgPool,
    config: &MeteringConfig,
    tenant_id: uuid::Uuid,
    tier: &str,
    agent_id: &str,
    resource: MeteredResource,
    by: i64,
) -> MemcoreResult<bool> {
    let limit = resource.limit(config, tier);
    if limit < 0 {
        return Ok(true);
    }
    metering_ops::soft_check(pool, tenant_id, resource.as_str(), agent_id, Utc::now().date_naive(), by, limit).await
}
