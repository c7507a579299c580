//! Consent grants (§3, §4.11). Pattern matching against `resource_pattern`
//! happens in `memcore-consent`; this module only persists rows. The one
//! exception is `revoke_api_keys_for_agent`, which reaches into the
//! `shared` schema and therefore takes the pool directly rather than a
//! tenant-scoped `Tx` — api keys are a cross-tenant registry.

use chrono::Utc;
use memcore_core::models::{ConsentRule, Permission};
use memcore_core::MemcoreResult;
use sqlx::{PgPool, Row as _};

use crate::codec::{permission_parse, permission_str};
use crate::tenant::Tx;
use crate::to_storage_err;

const SELECT_COLUMNS: &str = "id, agent_id, resource_pattern, permission, granted_at, revoked_at";

fn from_row(row: sqlx::postgres::PgRow) -> MemcoreResult<ConsentRule> {
    Ok(ConsentRule {
        id: row.try_get("id").map_err(to_storage_err)?,
        agent_id: row.try_get("agent_id").map_err(to_storage_err)?,
        resource_pattern: row.try_get("resource_pattern").map_err(to_storage_err)?,
        permission: permission_parse(row.try_get::<String, _>("permission").map_err(to_storage_err)?.as_str()),
        granted_at: row.try_get("granted_at").map_err(to_storage_err)?,
        revoked_at: row.try_get("revoked_at").map_err(to_storage_err)?,
    })
}

pub async fn grant(
    tx: &mut Tx<'_>,
    agent_id: &str,
    resource_pattern: &str,
    permission: Permission,
) -> MemcoreResult<ConsentRule> {
    let id = uuid::Uuid::new_v4();
    let sql = format!(
        "INSERT INTO consent_rules (id, agent_id, resource_pattern, permission, granted_at) \
         VALUES ($1, $2, $3, $4, now()) \
         RETURNING {SELECT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(agent_id)
        .bind(resource_pattern)
        .bind(permission_str(permission))
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    from_row(row)
}

pub async fn list_active_for_agent(tx: &mut Tx<'_>, agent_id: &str) -> MemcoreResult<Vec<ConsentRule>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM consent_rules WHERE agent_id = $1 AND revoked_at IS NULL"
    );
    let rows = sqlx::query(&sql)
        .bind(agent_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter().map(from_row).collect()
}

pub async fn revoke_rule(tx: &mut Tx<'_>, id: uuid::Uuid) -> MemcoreResult<()> {
    sqlx::query("UPDATE consent_rules SET revoked_at = now() WHERE id = $1 AND revoked_at IS NULL")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(to_storage_err)?;
    Ok(())
}

/// Revoke every active consent rule this agent holds, tenant-scoped half
/// of the §4.11 revocation cascade.
pub async fn revoke_all_for_agent(tx: &mut Tx<'_>, agent_id: &str) -> MemcoreResult<u64> {
    let result = sqlx::query(
        "UPDATE consent_rules SET revoked_at = now() WHERE agent_id = $1 AND revoked_at IS NULL",
    )
    .bind(agent_id)
    .execute(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    Ok(result.rows_affected())
}

/// Revoke every api key this agent holds across the tenant's account
/// (§4.11: "agent revocation cascades to api-keys-then-consent-rows").
/// Runs against `shared.api_keys`, so it takes the pool rather than a tx.
pub async fn revoke_api_keys_for_agent(pool: &PgPool, tenant_id: uuid::Uuid, agent_id: &str) -> MemcoreResult<u64> {
    let result = sqlx::query(
        "UPDATE shared.api_keys SET revoked_at = $3 \
         WHERE tenant_id = $1 AND agent_id = $2 AND revoked_at IS NULL",
    )
    .bind(tenant_id)
    .bind(agent_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(to_storage_err)?;

    Ok(result.rows_affected())
}
