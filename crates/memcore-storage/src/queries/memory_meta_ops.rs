//! Provenance + quality records (§3, §4.4). One row per fact, regardless
//! of which store (`profile`, `table`, `vector`, `entity`, `edge`) it backs.

use chrono::{DateTime, Utc};
use memcore_core::models::{MemoryMeta, MemoryOrigin, MemoryStatus, PromoteEvent, SourceRef, SourceType};
use memcore_core::MemcoreResult;
use sqlx::Row as _;

use crate::codec::{origin_parse, origin_str, source_type_parse, source_type_str, status_parse, status_str};
use crate::tenant::Tx;
use crate::to_storage_err;

const SELECT_COLUMNS: &str = "id, source_type, source_ref, origin, confidence, status, \
     access_count, last_accessed, last_reinforced, contradictions, promote_history, created_at";

fn from_row(row: sqlx::postgres::PgRow) -> MemcoreResult<MemoryMeta> {
    let source_ref: SourceRef = serde_json::from_value(row.try_get("source_ref").map_err(to_storage_err)?)?;
    let promote_history: Vec<PromoteEvent> =
        serde_json::from_value(row.try_get("promote_history").map_err(to_storage_err)?)?;

    Ok(MemoryMeta {
        id: row.try_get("id").map_err(to_storage_err)?,
        source_type: source_type_parse(row.try_get::<String, _>("source_type").map_err(to_storage_err)?.as_str()),
        source_ref,
        origin: origin_parse(row.try_get::<String, _>("origin").map_err(to_storage_err)?.as_str()),
        confidence: row.try_get("confidence").map_err(to_storage_err)?,
        status: status_parse(row.try_get::<String, _>("status").map_err(to_storage_err)?.as_str()),
        access_count: row.try_get("access_count").map_err(to_storage_err)?,
        last_accessed: row.try_get("last_accessed").map_err(to_storage_err)?,
        last_reinforced: row.try_get("last_reinforced").map_err(to_storage_err)?,
        contradictions: row.try_get("contradictions").map_err(to_storage_err)?,
        promote_history,
        created_at: row.try_get("created_at").map_err(to_storage_err)?,
    })
}

pub async fn create(
    tx: &mut Tx<'_>,
    source_type: SourceType,
    source_ref: &SourceRef,
    origin: MemoryOrigin,
) -> MemcoreResult<MemoryMeta> {
    let id = uuid::Uuid::new_v4();
    let confidence = origin.initial_confidence();
    let status = MemoryStatus::from_confidence(confidence);
    let source_ref_json = serde_json::to_value(source_ref)?;

    let sql = format!(
        "INSERT INTO _memory_meta \
             (id, source_type, source_ref, origin, confidence, status, \
              access_count, last_accessed, last_reinforced, contradictions, \
              promote_history, created_at) \
           VALUES ($1, $2, $3, $4, $5, $6, 0, now(), now(), '{{}}', '[]'::jsonb, now()) \
           RETURNING {SELECT_COLUMNS}"
    );

    let row = sqlx::query(&sql)
        .bind(id)
        .bind(source_type_str(source_type))
        .bind(&source_ref_json)
        .bind(origin_str(origin))
        .bind(confidence)
        .bind(status_str(status))
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    from_row(row)
}

pub async fn get(tx: &mut Tx<'_>, id: uuid::Uuid) -> MemcoreResult<Option<MemoryMeta>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM _memory_meta WHERE id = $1");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    row.map(from_row).transpose()
}

/// Apply a confidence/status transition, appending to `promote_history`
/// (§4.4). `reason` is a short machine token (`"reinforced"`,
/// `"contradiction"`, `"decay"`, `"user_resolve"`).
pub async fn transition(
    tx: &mut Tx<'_>,
    id: uuid::Uuid,
    to_confidence: f64,
    to_status: MemoryStatus,
    reason: &str,
) -> MemcoreResult<MemoryMeta> {
    let current = get(tx, id)
        .await?
        .ok_or_else(|| memcore_core::MemcoreError::NotFound {
            kind: "memory_meta".into(),
            id: id.to_string(),
        })?;

    let event = PromoteEvent {
        from_status: current.status,
        to_status,
        from_confidence: current.confidence,
        to_confidence,
        reason: reason.to_string(),
        at: Utc::now(),
    };
    let mut history = current.promote_history;
    history.push(event);
    let history_json = serde_json::to_value(&history)?;

    let sql = format!(
        "UPDATE _memory_meta \
           SET confidence = $2, status = $3, last_reinforced = now(), promote_history = $4 \
           WHERE id = $1 \
           RETURNING {SELECT_COLUMNS}"
    );

    let row = sqlx::query(&sql)
        .bind(id)
        .bind(to_confidence)
        .bind(status_str(to_status))
        .bind(&history_json)
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    from_row(row)
}

pub async fn record_access(tx: &mut Tx<'_>, id: uuid::Uuid) -> MemcoreResult<()> {
    sqlx::query(
        "UPDATE _memory_meta SET access_count = access_count + 1, last_accessed = now() WHERE id = $1",
    )
    .bind(id)
    .execute(&mut **tx)
    .await
    .map_err(to_storage_err)?;
    Ok(())
}

pub async fn append_contradiction(
    tx: &mut Tx<'_>,
    id: uuid::Uuid,
    contradicting_id: uuid::Uuid,
) -> MemcoreResult<()> {
    sqlx::query(
        "UPDATE _memory_meta SET contradictions = array_append(contradictions, $2) WHERE id = $1",
    )
    .bind(id)
    .bind(contradicting_id)
    .execute(&mut **tx)
    .await
    .map_err(to_storage_err)?;
    Ok(())
}

/// Candidates for the decay scheduler (§4.4): non-sticky rows whose last
/// reinforcement is older than `older_than`, oldest first, capped at
/// `limit` per sweep.
pub async fn list_decay_candidates(
    tx: &mut Tx<'_>,
    older_than: DateTime<Utc>,
    limit: i64,
) -> MemcoreResult<Vec<MemoryMeta>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM _memory_meta \
           WHERE status NOT IN ('review', 'rejected') AND last_reinforced < $1 \
           ORDER BY last_reinforced ASC LIMIT $2"
    );

    let rows = sqlx::query(&sql)
        .bind(older_than)
        .bind(limit)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter().map(from_row).collect()
}
