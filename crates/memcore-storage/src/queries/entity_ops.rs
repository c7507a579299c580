//! Knowledge-graph nodes (§3, §4.6, §4.10). Entities are soft-deleted
//! (merged-away duplicates keep a tombstone) and have a unique live index
//! on `(entity_type, lower(name))` so two writes racing to create "Sarah"
//! under `person` collide at the database, not in application logic.

use chrono::{DateTime, Utc};
use memcore_core::models::{Entity, EntityType};
use memcore_core::{MemcoreError, MemcoreResult};
use sqlx::Row as _;

use crate::tenant::Tx;
use crate::to_storage_err;

const SELECT_COLUMNS: &str =
    "id, entity_type, name, properties, confidence, mention_count, first_seen, last_seen, deleted_at";

fn from_row(row: sqlx::postgres::PgRow) -> MemcoreResult<Entity> {
    let entity_type_str: String = row.try_get("entity_type").map_err(to_storage_err)?;
    let entity_type = EntityType::parse(&entity_type_str).unwrap_or(EntityType::Custom);
    Ok(Entity {
        id: row.try_get("id").map_err(to_storage_err)?,
        entity_type,
        name: row.try_get("name").map_err(to_storage_err)?,
        properties: row.try_get("properties").map_err(to_storage_err)?,
        confidence: row.try_get("confidence").map_err(to_storage_err)?,
        mention_count: row.try_get("mention_count").map_err(to_storage_err)?,
        first_seen: row.try_get("first_seen").map_err(to_storage_err)?,
        last_seen: row.try_get("last_seen").map_err(to_storage_err)?,
        deleted_at: row.try_get("deleted_at").map_err(to_storage_err)?,
    })
}

pub async fn create(
    tx: &mut Tx<'_>,
    entity_type: EntityType,
    name: &str,
    properties: &serde_json::Value,
    confidence: f64,
) -> MemcoreResult<Entity> {
    let id = uuid::Uuid::new_v4();
    let sql = format!(
        "INSERT INTO entities (id, entity_type, name, properties, confidence, mention_count, \
           first_seen, last_seen) \
         VALUES ($1, $2, $3, $4, $5, 1, now(), now()) \
         RETURNING {SELECT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(entity_type.as_str())
        .bind(name)
        .bind(properties)
        .bind(confidence)
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    from_row(row)
}

pub async fn get(tx: &mut Tx<'_>, id: uuid::Uuid) -> MemcoreResult<Option<Entity>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM entities WHERE id = $1");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    row.map(from_row).transpose()
}

/// The exact match the unique live index enforces: same type, same name
/// case-insensitively, not deleted.
pub async fn find_exact(
    tx: &mut Tx<'_>,
    entity_type: EntityType,
    name: &str,
) -> MemcoreResult<Option<Entity>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM entities \
         WHERE entity_type = $1 AND lower(name) = lower($2) AND deleted_at IS NULL"
    );
    let row = sqlx::query(&sql)
        .bind(entity_type.as_str())
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    row.map(from_row).transpose()
}

/// Trigram-similarity candidates for fuzzy dedup (§4.5 stage 3), ordered
/// by similarity descending. `threshold` is the `pg_trgm` similarity cutoff.
pub async fn find_by_trigram(
    tx: &mut Tx<'_>,
    entity_type: EntityType,
    name: &str,
    threshold: f32,
    limit: i64,
) -> MemcoreResult<Vec<(Entity, f32)>> {
    let sql = "SELECT id, entity_type, name, properties, confidence, mention_count, first_seen, \
               last_seen, deleted_at, similarity(name, $2) AS sim \
               FROM entities \
               WHERE entity_type = $1 AND deleted_at IS NULL AND similarity(name, $2) > $3 \
               ORDER BY sim DESC LIMIT $4";
    let rows = sqlx::query(sql)
        .bind(entity_type.as_str())
        .bind(name)
        .bind(threshold)
        .bind(limit)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter()
        .map(|row| {
            let sim: f32 = row.try_get("sim").map_err(to_storage_err)?;
            from_row(row).map(|e| (e, sim))
        })
        .collect::<MemcoreResult<Vec<_>>>()
}

/// Cross-type candidates for stage 6 (same name, any other entity type).
pub async fn find_cross_type(tx: &mut Tx<'_>, name: &str) -> MemcoreResult<Vec<Entity>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM entities WHERE lower(name) = lower($1) AND deleted_at IS NULL"
    );
    let rows = sqlx::query(&sql)
        .bind(name)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter().map(from_row).collect()
}

/// Reinforce an existing entity on re-mention (§4.6): bump mention count,
/// touch `last_seen`, and nudge confidence toward 1.0.
pub async fn reinforce(tx: &mut Tx<'_>, id: uuid::Uuid, confidence_delta: f64) -> MemcoreResult<Entity> {
    let sql = format!(
        "UPDATE entities \
         SET mention_count = mention_count + 1, last_seen = now(), \
             confidence = LEAST(1.0, confidence + $2) \
         WHERE id = $1 \
         RETURNING {SELECT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(confidence_delta)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?
        .ok_or_else(|| MemcoreError::NotFound {
            kind: "entity".into(),
            id: id.to_string(),
        })?;

    from_row(row)
}

pub async fn update_properties(
    tx: &mut Tx<'_>,
    id: uuid::Uuid,
    properties: &serde_json::Value,
) -> MemcoreResult<Entity> {
    let sql = format!(
        "UPDATE entities SET properties = properties || $2 WHERE id = $1 RETURNING {SELECT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(properties)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?
        .ok_or_else(|| MemcoreError::NotFound {
            kind: "entity".into(),
            id: id.to_string(),
        })?;

    from_row(row)
}

/// Soft-delete `loser` into `winner` (§4.5 merge semantics): properties
/// merged with `winner` taking precedence on key conflicts, `loser.name`
/// and `loser`'s aliases folded into `winner`'s alias list, mention counts
/// summed, confidence set to the max of the two, and `first_seen` set to
/// the earlier of the two. Callers own rewiring edges before calling this.
pub async fn merge_into(
    tx: &mut Tx<'_>,
    winner: uuid::Uuid,
    loser: uuid::Uuid,
    merged_at: DateTime<Utc>,
) -> MemcoreResult<Entity> {
    let winner_entity = get(tx, winner)
        .await?
        .ok_or_else(|| MemcoreError::NotFound {
            kind: "entity".into(),
            id: winner.to_string(),
        })?;
    let loser_entity = get(tx, loser)
        .await?
        .ok_or_else(|| MemcoreError::NotFound {
            kind: "entity".into(),
            id: loser.to_string(),
        })?;

    let mut aliases = winner_entity.aliases();
    aliases.extend(loser_entity.aliases());
    aliases.push(loser_entity.name.clone());
    aliases.sort();
    aliases.dedup();

    let mut properties = loser_entity.properties.clone();
    if let (Some(merged), Some(winner_props)) =
        (properties.as_object_mut(), winner_entity.properties.as_object())
    {
        for (k, v) in winner_props {
            merged.insert(k.clone(), v.clone());
        }
    }
    if let Some(merged) = properties.as_object_mut() {
        merged.insert("aliases".to_string(), serde_json::json!(aliases));
    }

    sqlx::query("UPDATE entities SET deleted_at = $2 WHERE id = $1")
        .bind(loser)
        .bind(merged_at)
        .execute(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    let sql = format!(
        "UPDATE entities \
         SET properties = $2, mention_count = mention_count + $3, \
             confidence = GREATEST(confidence, $4), first_seen = LEAST(first_seen, $5) \
         WHERE id = $1 \
         RETURNING {SELECT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(winner)
        .bind(&properties)
        .bind(loser_entity.mention_count)
        .bind(loser_entity.confidence)
        .bind(loser_entity.first_seen)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?
        .ok_or_else(|| MemcoreError::NotFound {
            kind: "entity".into(),
            id: winner.to_string(),
        })?;

    from_row(row)
}

/// The top entities by mention count across every type, for the LLM
/// extraction prompt's existing-entity digest (§4.10).
pub async fn top_by_mention(tx: &mut Tx<'_>, limit: i64) -> MemcoreResult<Vec<Entity>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM entities WHERE deleted_at IS NULL \
         ORDER BY mention_count DESC LIMIT $1"
    );
    let rows = sqlx::query(&sql)
        .bind(limit)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter().map(from_row).collect()
}

/// Live entity count for the tenant, the `graphEntities` tier-limit
/// resource (§4.12).
pub async fn count_live(tx: &mut Tx<'_>) -> MemcoreResult<i64> {
    let row = sqlx::query("SELECT count(*) AS n FROM entities WHERE deleted_at IS NULL")
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;
    row.try_get("n").map_err(to_storage_err)
}

pub async fn list_by_type(tx: &mut Tx<'_>, entity_type: EntityType, limit: i64) -> MemcoreResult<Vec<Entity>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM entities WHERE entity_type = $1 AND deleted_at IS NULL \
         ORDER BY last_seen DESC LIMIT $2"
    );
    let rows = sqlx::query(&sql)
        .bind(entity_type.as_str())
        .bind(limit)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter().map(from_row).collect()
}
