//! Agent revocation (§4.11): api keys first for an immediate auth-layer
//! lockout, then every surviving consent row.

use memcore_core::MemcoreResult;
use memcore_storage::queries::consent_ops;
use memcore_storage::tenant::Tx;
use sqlx::PgPool;

pub struct RevocationOutcome {
    pub api_keys_revoked: u64,
    pub consent_rules_revoked: u64,
}

/// Revoke `agent_id` within `tenant_id`: api keys (cross-tenant, pool-
/// level) first, then the tenant-scoped consent rows in the same `tx`.
/// Callers run this inside `TenantStore::with_tenant` for the consent
/// half; the api-key half runs against the shared pool before the tx's
/// search path is even relevant.
pub async fn revoke_agent(
    pool: &PgPool,
    tx: &mut Tx<'_>,
    tenant_id: uuid::Uuid,
    agent_id: &str,
) -> MemcoreResult<RevocationOutcome> {
    let api_keys_revoked = consent_ops::revoke_api_keys_for_agent(pool, tenant_id, agent_id).await?;
    let consent_rules_revoked = consent_ops::revoke_all_for_agent(tx, agent_id).await?;

    Ok(RevocationOutcome { api_keys_revoked, consent_rules_revoked })
}
