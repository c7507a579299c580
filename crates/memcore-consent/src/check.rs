//! The call site callers actually use: fetch an agent's active rules and
//! resolve one resource/permission check in one step.

use memcore_core::models::Permission;
use memcore_core::{MemcoreError, MemcoreResult};
use memcore_storage::queries::consent_ops;
use memcore_storage::tenant::Tx;

use crate::resolve::is_authorized;

/// `CONSENT_DENIED` on a missing or underpowered rule (§7); `Ok(())` when
/// the agent's active rules authorize `required` on `resource`.
pub async fn require_consent(
    tx: &mut Tx<'_>,
    agent_id: &str,
    resource: &str,
    required: Permission,
) -> MemcoreResult<()> {
    let rules = consent_ops::list_active_for_agent(tx, agent_id).await?;

    if is_authorized(&rules, resource, required) {
        Ok(())
    } else {
        Err(MemcoreError::ConsentDenied {
            agent_id: agent_id.to_string(),
            resource: resource.to_string(),
            permission: format!("{required:?}"),
        })
    }
}
