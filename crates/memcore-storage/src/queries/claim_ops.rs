//! The knowledge-claim ledger (§3, §4.10): an append-only record of what
//! was asserted by which write, plus status-transition events.

use memcore_core::models::{ClaimEvent, ClaimStatus, KnowledgeClaim, MemoryOrigin, Subject};
use memcore_core::MemcoreResult;
use sqlx::Row as _;

use crate::codec::{claim_status_parse, claim_status_str, origin_parse, origin_str};
use crate::tenant::Tx;
use crate::to_storage_err;

const SELECT_COLUMNS: &str = "id, claim_type, subject, predicate, object, confidence, status, \
     method, origin, source_ref, write_id, agent_id, evidence, created_at";

fn from_row(row: sqlx::postgres::PgRow) -> MemcoreResult<KnowledgeClaim> {
    let subject: Subject = serde_json::from_value(row.try_get("subject").map_err(to_storage_err)?)?;
    Ok(KnowledgeClaim {
        id: row.try_get("id").map_err(to_storage_err)?,
        claim_type: row.try_get("claim_type").map_err(to_storage_err)?,
        subject,
        predicate: row.try_get("predicate").map_err(to_storage_err)?,
        object: row.try_get("object").map_err(to_storage_err)?,
        confidence: row.try_get("confidence").map_err(to_storage_err)?,
        status: claim_status_parse(row.try_get::<String, _>("status").map_err(to_storage_err)?.as_str()),
        method: row.try_get("method").map_err(to_storage_err)?,
        origin: origin_parse(row.try_get::<String, _>("origin").map_err(to_storage_err)?.as_str()),
        source_ref: row.try_get("source_ref").map_err(to_storage_err)?,
        write_id: row.try_get("write_id").map_err(to_storage_err)?,
        agent_id: row.try_get("agent_id").map_err(to_storage_err)?,
        evidence: row.try_get("evidence").map_err(to_storage_err)?,
        created_at: row.try_get("created_at").map_err(to_storage_err)?,
    })
}

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    tx: &mut Tx<'_>,
    claim_type: &str,
    subject: &Subject,
    predicate: &str,
    object: &serde_json::Value,
    confidence: f64,
    method: &str,
    origin: MemoryOrigin,
    source_ref: &serde_json::Value,
    write_id: uuid::Uuid,
    agent_id: &str,
    evidence: &[String],
) -> MemcoreResult<KnowledgeClaim> {
    let id = uuid::Uuid::new_v4();
    let subject_json = serde_json::to_value(subject)?;

    let sql = format!(
        "INSERT INTO knowledge_claims \
           (id, claim_type, subject, predicate, object, confidence, status, method, origin, \
            source_ref, write_id, agent_id, evidence, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, now()) \
         RETURNING {SELECT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(claim_type)
        .bind(&subject_json)
        .bind(predicate)
        .bind(object)
        .bind(confidence)
        .bind(claim_status_str(ClaimStatus::Created))
        .bind(method)
        .bind(origin_str(origin))
        .bind(source_ref)
        .bind(write_id)
        .bind(agent_id)
        .bind(evidence)
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    from_row(row)
}

pub async fn set_status(tx: &mut Tx<'_>, id: uuid::Uuid, status: ClaimStatus) -> MemcoreResult<KnowledgeClaim> {
    let sql = format!("UPDATE knowledge_claims SET status = $2 WHERE id = $1 RETURNING {SELECT_COLUMNS}");
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(claim_status_str(status))
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    from_row(row)
}

pub async fn record_event(
    tx: &mut Tx<'_>,
    claim_id: uuid::Uuid,
    event: ClaimStatus,
    detail: &serde_json::Value,
) -> MemcoreResult<ClaimEvent> {
    let id = uuid::Uuid::new_v4();
    let row = sqlx::query(
        "INSERT INTO claim_events (id, claim_id, event, at, detail) \
         VALUES ($1, $2, $3, now(), $4) \
         RETURNING id, claim_id, event, at, detail",
    )
    .bind(id)
    .bind(claim_id)
    .bind(claim_status_str(event))
    .bind(detail)
    .fetch_one(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    Ok(ClaimEvent {
        id: row.try_get("id").map_err(to_storage_err)?,
        claim_id: row.try_get("claim_id").map_err(to_storage_err)?,
        event: claim_status_parse(row.try_get::<String, _>("event").map_err(to_storage_err)?.as_str()),
        at: row.try_get("at").map_err(to_storage_err)?,
        detail: row.try_get("detail").map_err(to_storage_err)?,
    })
}

pub async fn list_by_write_id(tx: &mut Tx<'_>, write_id: uuid::Uuid) -> MemcoreResult<Vec<KnowledgeClaim>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM knowledge_claims WHERE write_id = $1");
    let rows = sqlx::query(&sql)
        .bind(write_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter().map(from_row).collect()
}
