//! Append-only pipeline audit log (§3, §4.11). Writes here are
//! best-effort from the caller's perspective: a failed audit write is
//! itself logged via `tracing`, never allowed to fail the write it's
//! describing.

use memcore_core::models::{AuditEvent, PipelineStage};
use memcore_core::MemcoreResult;
use sqlx::Row as _;

use crate::tenant::Tx;
use crate::to_storage_err;

fn stage_str(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::ProfileWritten => "profile_written",
        PipelineStage::TableWritten => "table_written",
        PipelineStage::VectorWritten => "vector_written",
        PipelineStage::VectorPending => "vector_pending",
        PipelineStage::EnrichmentQueued => "enrichment_queued",
        PipelineStage::EnrichmentDone => "enrichment_done",
        PipelineStage::EnrichmentFailed => "enrichment_failed",
    }
}

fn stage_parse(s: &str) -> PipelineStage {
    match s {
        "table_written" => PipelineStage::TableWritten,
        "vector_written" => PipelineStage::VectorWritten,
        "vector_pending" => PipelineStage::VectorPending,
        "enrichment_queued" => PipelineStage::EnrichmentQueued,
        "enrichment_done" => PipelineStage::EnrichmentDone,
        "enrichment_failed" => PipelineStage::EnrichmentFailed,
        _ => PipelineStage::ProfileWritten,
    }
}

fn from_row(row: sqlx::postgres::PgRow) -> MemcoreResult<AuditEvent> {
    Ok(AuditEvent {
        id: row.try_get("id").map_err(to_storage_err)?,
        write_id: row.try_get("write_id").map_err(to_storage_err)?,
        stage: stage_parse(row.try_get::<String, _>("stage").map_err(to_storage_err)?.as_str()),
        source_ref: row.try_get("source_ref").map_err(to_storage_err)?,
        latency_ms: row.try_get("latency_ms").map_err(to_storage_err)?,
        success: row.try_get("success").map_err(to_storage_err)?,
        detail: row.try_get("detail").map_err(to_storage_err)?,
        at: row.try_get("at").map_err(to_storage_err)?,
    })
}

pub async fn record(
    tx: &mut Tx<'_>,
    write_id: uuid::Uuid,
    stage: PipelineStage,
    source_ref: Option<&serde_json::Value>,
    latency_ms: Option<i64>,
    success: bool,
    detail: &serde_json::Value,
) -> MemcoreResult<AuditEvent> {
    let id = uuid::Uuid::new_v4();
    let row = sqlx::query(
        "INSERT INTO audit_log (id, write_id, stage, source_ref, latency_ms, success, detail, at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, now()) \
         RETURNING id, write_id, stage, source_ref, latency_ms, success, detail, at",
    )
    .bind(id)
    .bind(write_id)
    .bind(stage_str(stage))
    .bind(source_ref)
    .bind(latency_ms)
    .bind(success)
    .bind(detail)
    .fetch_one(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    from_row(row)
}

pub async fn list_by_write_id(tx: &mut Tx<'_>, write_id: uuid::Uuid) -> MemcoreResult<Vec<AuditEvent>> {
    let rows = sqlx::query(
        "SELECT id, write_id, stage, source_ref, latency_ms, success, detail, at \
         FROM audit_log WHERE write_id = $1 ORDER BY at ASC",
    )
    .bind(write_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    rows.into_iter().map(from_row).collect()
}
