//! Graph edges (§3, §4.6). Reinforcement saturates weight at
//! `MAX_EDGE_WEIGHT`; temporal relations (`works_at`-style) keep only one
//! `is_current = true` edge per `(source, relation)` pair.

use chrono::Utc;
use memcore_core::models::{Edge, EdgeEvidence, BUILTIN_TEMPORAL_RELATIONS, MAX_EDGE_WEIGHT};
use memcore_core::{MemcoreError, MemcoreResult};
use sqlx::Row as _;

use crate::queries::memory_meta_ops;
use crate::tenant::Tx;
use crate::to_storage_err;

const SELECT_COLUMNS: &str = "id, source_id, target_id, relation, weight, confidence, evidence, \
     properties, is_current, meta_id, first_seen, last_seen, deleted_at";

fn from_row(row: sqlx::postgres::PgRow) -> MemcoreResult<Edge> {
    let evidence: Vec<EdgeEvidence> =
        serde_json::from_value(row.try_get("evidence").map_err(to_storage_err)?)?;
    Ok(Edge {
        id: row.try_get("id").map_err(to_storage_err)?,
        source_id: row.try_get("source_id").map_err(to_storage_err)?,
        target_id: row.try_get("target_id").map_err(to_storage_err)?,
        relation: row.try_get("relation").map_err(to_storage_err)?,
        weight: row.try_get("weight").map_err(to_storage_err)?,
        confidence: row.try_get("confidence").map_err(to_storage_err)?,
        evidence,
        properties: row.try_get("properties").map_err(to_storage_err)?,
        is_current: row.try_get("is_current").map_err(to_storage_err)?,
        meta_id: row.try_get("meta_id").map_err(to_storage_err)?,
        first_seen: row.try_get("first_seen").map_err(to_storage_err)?,
        last_seen: row.try_get("last_seen").map_err(to_storage_err)?,
        deleted_at: row.try_get("deleted_at").map_err(to_storage_err)?,
    })
}

pub fn is_temporal_relation(relation: &str) -> bool {
    BUILTIN_TEMPORAL_RELATIONS.contains(&relation)
}

/// Create an edge. `meta_id` is the caller's already-created
/// `_memory_meta` row for this edge (§3 provenance). When `relation` is a
/// temporal relation, any prior same-source current edges are flipped to
/// `is_current = false` and a contradiction is registered between their
/// meta rows and `meta_id` (§4.6 step 4).
pub async fn create(
    tx: &mut Tx<'_>,
    source_id: uuid::Uuid,
    target_id: uuid::Uuid,
    relation: &str,
    confidence: f64,
    evidence_text: Option<&str>,
    write_id: Option<uuid::Uuid>,
    meta_id: uuid::Uuid,
) -> MemcoreResult<Edge> {
    if is_temporal_relation(relation) {
        let sql = "UPDATE edges SET is_current = false WHERE source_id = $1 AND relation = $2 \
                    AND is_current = true AND deleted_at IS NULL RETURNING meta_id";
        let flipped = sqlx::query(sql)
            .bind(source_id)
            .bind(relation)
            .fetch_all(&mut **tx)
            .await
            .map_err(to_storage_err)?;

        for row in flipped {
            let prior_meta_id: uuid::Uuid = row.try_get("meta_id").map_err(to_storage_err)?;
            memory_meta_ops::append_contradiction(tx, meta_id, prior_meta_id).await?;
        }
    }

    let id = uuid::Uuid::new_v4();
    let evidence = evidence_text
        .map(|text| {
            vec![EdgeEvidence {
                text: text.to_string(),
                write_id,
                recorded_at: Utc::now(),
            }]
        })
        .unwrap_or_default();
    let evidence_json = serde_json::to_value(&evidence)?;

    let sql = format!(
        "INSERT INTO edges (id, source_id, target_id, relation, weight, confidence, evidence, \
           properties, is_current, meta_id, first_seen, last_seen) \
         VALUES ($1, $2, $3, $4, 1.0, $5, $6, '{{}}'::jsonb, true, $7, now(), now()) \
         RETURNING {SELECT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(source_id)
        .bind(target_id)
        .bind(relation)
        .bind(confidence)
        .bind(&evidence_json)
        .bind(meta_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    from_row(row)
}

pub async fn find_triple(
    tx: &mut Tx<'_>,
    source_id: uuid::Uuid,
    target_id: uuid::Uuid,
    relation: &str,
) -> MemcoreResult<Option<Edge>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM edges \
         WHERE source_id = $1 AND target_id = $2 AND relation = $3 AND deleted_at IS NULL"
    );
    let row = sqlx::query(&sql)
        .bind(source_id)
        .bind(target_id)
        .bind(relation)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    row.map(from_row).transpose()
}

/// Reinforce an existing edge: saturate weight at `MAX_EDGE_WEIGHT`,
/// append new evidence, touch `last_seen` (§4.6).
pub async fn reinforce(
    tx: &mut Tx<'_>,
    id: uuid::Uuid,
    evidence_text: Option<&str>,
    write_id: Option<uuid::Uuid>,
) -> MemcoreResult<Edge> {
    let current = find_by_id(tx, id)
        .await?
        .ok_or_else(|| MemcoreError::NotFound {
            kind: "edge".into(),
            id: id.to_string(),
        })?;

    let mut evidence = current.evidence;
    if let Some(text) = evidence_text {
        evidence.push(EdgeEvidence {
            text: text.to_string(),
            write_id,
            recorded_at: Utc::now(),
        });
    }
    let evidence_json = serde_json::to_value(&evidence)?;
    let new_weight = (current.weight + 1.0).min(MAX_EDGE_WEIGHT);

    let sql = format!(
        "UPDATE edges SET weight = $2, evidence = $3, last_seen = now() \
         WHERE id = $1 RETURNING {SELECT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(new_weight)
        .bind(&evidence_json)
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    from_row(row)
}

/// Collapse a duplicate edge into `id` during an entity merge (§4.5):
/// weights sum (capped at `MAX_EDGE_WEIGHT`), confidence takes the max of
/// the two, and evidence arrays are concatenated rather than just taking
/// the survivor's first entry.
pub async fn collapse(
    tx: &mut Tx<'_>,
    id: uuid::Uuid,
    other_weight: f64,
    other_confidence: f64,
    other_evidence: &[EdgeEvidence],
) -> MemcoreResult<Edge> {
    let current = find_by_id(tx, id)
        .await?
        .ok_or_else(|| MemcoreError::NotFound {
            kind: "edge".into(),
            id: id.to_string(),
        })?;

    let new_weight = (current.weight + other_weight).min(MAX_EDGE_WEIGHT);
    let new_confidence = current.confidence.max(other_confidence);
    let mut evidence = current.evidence;
    evidence.extend(other_evidence.iter().cloned());
    let evidence_json = serde_json::to_value(&evidence)?;

    let sql = format!(
        "UPDATE edges SET weight = $2, confidence = $3, evidence = $4, last_seen = now() \
         WHERE id = $1 RETURNING {SELECT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(new_weight)
        .bind(new_confidence)
        .bind(&evidence_json)
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    from_row(row)
}

async fn find_by_id(tx: &mut Tx<'_>, id: uuid::Uuid) -> MemcoreResult<Option<Edge>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM edges WHERE id = $1");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    row.map(from_row).transpose()
}

pub async fn list_from(tx: &mut Tx<'_>, source_id: uuid::Uuid) -> MemcoreResult<Vec<Edge>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM edges WHERE source_id = $1 AND deleted_at IS NULL"
    );
    let rows = sqlx::query(&sql)
        .bind(source_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter().map(from_row).collect()
}

pub async fn list_to(tx: &mut Tx<'_>, target_id: uuid::Uuid) -> MemcoreResult<Vec<Edge>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM edges WHERE target_id = $1 AND deleted_at IS NULL"
    );
    let rows = sqlx::query(&sql)
        .bind(target_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter().map(from_row).collect()
}

/// The most common outgoing relation for an entity, used to annotate the
/// top-entities digest handed to the LLM extractor (§4.10).
pub async fn dominant_relation_for(tx: &mut Tx<'_>, entity_id: uuid::Uuid) -> MemcoreResult<Option<String>> {
    let row = sqlx::query(
        "SELECT relation FROM edges WHERE source_id = $1 AND deleted_at IS NULL \
         GROUP BY relation ORDER BY count(*) DESC LIMIT 1",
    )
    .bind(entity_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    row.map(|r| r.try_get("relation").map_err(to_storage_err)).transpose()
}

pub async fn soft_delete(tx: &mut Tx<'_>, id: uuid::Uuid) -> MemcoreResult<()> {
    sqlx::query("UPDATE edges SET deleted_at = now() WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(to_storage_err)?;
    Ok(())
}

/// Record a low-confidence or ontology-rejected relation for review
/// instead of writing it straight into the live graph (§4.3, §4.6).
pub async fn quarantine(
    tx: &mut Tx<'_>,
    source_id: uuid::Uuid,
    target_id: uuid::Uuid,
    relation: &str,
    reason: &str,
) -> MemcoreResult<uuid::Uuid> {
    let id = uuid::Uuid::new_v4();
    sqlx::query(
        "INSERT INTO edge_quarantine (id, source_id, target_id, relation, reason, created_at) \
         VALUES ($1, $2, $3, $4, $5, now())",
    )
    .bind(id)
    .bind(source_id)
    .bind(target_id)
    .bind(relation)
    .bind(reason)
    .execute(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    Ok(id)
}
