//! The tenant's owner entity (§4.10): a `Person` entity with
//! `properties.is_owner = true`, lazily created the first time an edge
//! needs to originate from "the account" rather than a named entity.

use memcore_core::models::{Entity, EntityType};
use memcore_core::MemcoreResult;
use memcore_storage::queries::{entity_ops, profile_ops};
use memcore_storage::tenant::Tx;

async fn find_owner(tx: &mut Tx<'_>) -> MemcoreResult<Option<Entity>> {
    let people = entity_ops::list_by_type(tx, EntityType::Person, 500).await?;
    Ok(people.into_iter().find(|e| e.is_owner()))
}

/// Name the owner entity from `profile.name`, falling back to `"user"`
/// when the profile is empty (§4.10).
async fn owner_name(tx: &mut Tx<'_>) -> MemcoreResult<String> {
    let name = profile_ops::latest(tx)
        .await?
        .and_then(|v| v.document.get("name").and_then(|n| n.as_str()).map(str::to_string));
    Ok(name.unwrap_or_else(|| "user".to_string()))
}

/// Fetch the owner entity, creating it on first use.
pub async fn get_or_create_owner(tx: &mut Tx<'_>) -> MemcoreResult<Entity> {
    if let Some(owner) = find_owner(tx).await? {
        return Ok(owner);
    }

    let name = owner_name(tx).await?;
    let properties = serde_json::json!({ "is_owner": true });
    entity_ops::create(tx, EntityType::Person, &name, &properties, 0.95).await
}
