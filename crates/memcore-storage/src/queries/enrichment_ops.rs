//! The enrichment job queue and its `pending_vectors`/`memory_backlog`
//! overflow tables (§4.8 step 7, §4.9). Claiming uses
//! `FOR UPDATE SKIP LOCKED` so concurrent worker instances never block on
//! each other, let alone deadlock.

use chrono::{DateTime, Utc};
use memcore_core::models::{EnrichmentJob, JobStatus, JobTarget, PendingVector};
use memcore_core::MemcoreResult;
use sqlx::Row as _;

use crate::codec::{job_status_parse, job_status_str};
use crate::tenant::Tx;
use crate::to_storage_err;

const JOB_COLUMNS: &str =
    "id, write_id, target, payload, status, attempt_count, next_run_at, last_error, created_at";
const PENDING_VECTOR_COLUMNS: &str =
    "id, collection, text, metadata, meta_id, status, attempt_count, next_run_at, last_error, created_at";

fn job_from_row(row: sqlx::postgres::PgRow) -> MemcoreResult<EnrichmentJob> {
    let target: JobTarget = serde_json::from_value(row.try_get("target").map_err(to_storage_err)?)?;
    Ok(EnrichmentJob {
        id: row.try_get("id").map_err(to_storage_err)?,
        write_id: row.try_get("write_id").map_err(to_storage_err)?,
        target,
        payload: row.try_get("payload").map_err(to_storage_err)?,
        status: job_status_parse(row.try_get::<String, _>("status").map_err(to_storage_err)?.as_str()),
        attempt_count: row.try_get("attempt_count").map_err(to_storage_err)?,
        next_run_at: row.try_get("next_run_at").map_err(to_storage_err)?,
        last_error: row.try_get("last_error").map_err(to_storage_err)?,
        created_at: row.try_get("created_at").map_err(to_storage_err)?,
    })
}

fn pending_vector_from_row(row: sqlx::postgres::PgRow) -> MemcoreResult<PendingVector> {
    Ok(PendingVector {
        id: row.try_get("id").map_err(to_storage_err)?,
        collection: row.try_get("collection").map_err(to_storage_err)?,
        text: row.try_get("text").map_err(to_storage_err)?,
        metadata: row.try_get("metadata").map_err(to_storage_err)?,
        meta_id: row.try_get("meta_id").map_err(to_storage_err)?,
        status: job_status_parse(row.try_get::<String, _>("status").map_err(to_storage_err)?.as_str()),
        attempt_count: row.try_get("attempt_count").map_err(to_storage_err)?,
        next_run_at: row.try_get("next_run_at").map_err(to_storage_err)?,
        last_error: row.try_get("last_error").map_err(to_storage_err)?,
        created_at: row.try_get("created_at").map_err(to_storage_err)?,
    })
}

pub async fn enqueue(
    tx: &mut Tx<'_>,
    write_id: uuid::Uuid,
    target: &JobTarget,
    payload: &serde_json::Value,
) -> MemcoreResult<EnrichmentJob> {
    let id = uuid::Uuid::new_v4();
    let target_json = serde_json::to_value(target)?;

    let sql = format!(
        "INSERT INTO enrichment_jobs (id, write_id, target, payload, status, attempt_count, next_run_at, created_at) \
         VALUES ($1, $2, $3, $4, $5, 0, now(), now()) \
         RETURNING {JOB_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(write_id)
        .bind(&target_json)
        .bind(payload)
        .bind(job_status_str(JobStatus::Pending))
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    job_from_row(row)
}

/// Claim up to `limit` eligible jobs, locking each row so no other worker
/// picks it up concurrently (§4.9).
pub async fn claim_batch(tx: &mut Tx<'_>, limit: i64) -> MemcoreResult<Vec<EnrichmentJob>> {
    let sql = format!(
        "UPDATE enrichment_jobs SET status = 'processing' \
         WHERE id IN ( \
           SELECT id FROM enrichment_jobs \
           WHERE status IN ('pending', 'retry') AND next_run_at <= now() \
           ORDER BY next_run_at ASC \
           LIMIT $1 \
           FOR UPDATE SKIP LOCKED \
         ) \
         RETURNING {JOB_COLUMNS}"
    );
    let rows = sqlx::query(&sql)
        .bind(limit)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter().map(job_from_row).collect()
}

pub async fn mark_done(tx: &mut Tx<'_>, id: uuid::Uuid) -> MemcoreResult<()> {
    sqlx::query("UPDATE enrichment_jobs SET status = 'done' WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(to_storage_err)?;
    Ok(())
}

pub async fn mark_retry(
    tx: &mut Tx<'_>,
    id: uuid::Uuid,
    next_run_at: DateTime<Utc>,
    error: &str,
) -> MemcoreResult<()> {
    sqlx::query(
        "UPDATE enrichment_jobs \
         SET status = 'retry', attempt_count = attempt_count + 1, next_run_at = $2, last_error = $3 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(next_run_at)
    .bind(error)
    .execute(&mut **tx)
    .await
    .map_err(to_storage_err)?;
    Ok(())
}

pub async fn mark_failed(tx: &mut Tx<'_>, id: uuid::Uuid, error: &str) -> MemcoreResult<()> {
    sqlx::query(
        "UPDATE enrichment_jobs SET status = 'failed', last_error = $2, attempt_count = attempt_count + 1 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(error)
    .execute(&mut **tx)
    .await
    .map_err(to_storage_err)?;
    Ok(())
}

/// How many unprocessed jobs are waiting, used by the worker pool's
/// startup probe (§4.9) to decide whether to run an immediate sweep.
pub async fn count_pending(tx: &mut Tx<'_>) -> MemcoreResult<i64> {
    let row = sqlx::query(
        "SELECT count(*) AS n FROM enrichment_jobs WHERE status IN ('pending', 'retry') AND next_run_at <= now()",
    )
    .fetch_one(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    row.try_get("n").map_err(to_storage_err)
}

pub async fn enqueue_pending_vector(
    tx: &mut Tx<'_>,
    collection: &str,
    text: &str,
    metadata: &serde_json::Value,
    meta_id: uuid::Uuid,
) -> MemcoreResult<PendingVector> {
    let id = uuid::Uuid::new_v4();
    let sql = format!(
        "INSERT INTO pending_vectors (id, collection, text, metadata, meta_id, status, attempt_count, next_run_at, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, 0, now(), now()) \
         RETURNING {PENDING_VECTOR_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(collection)
        .bind(text)
        .bind(metadata)
        .bind(meta_id)
        .bind(job_status_str(JobStatus::Pending))
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    pending_vector_from_row(row)
}

pub async fn claim_pending_vectors(tx: &mut Tx<'_>, limit: i64) -> MemcoreResult<Vec<PendingVector>> {
    let sql = format!(
        "UPDATE pending_vectors SET status = 'processing' \
         WHERE id IN ( \
           SELECT id FROM pending_vectors \
           WHERE status IN ('pending', 'retry') AND next_run_at <= now() \
           ORDER BY next_run_at ASC LIMIT $1 FOR UPDATE SKIP LOCKED \
         ) \
         RETURNING {PENDING_VECTOR_COLUMNS}"
    );
    let rows = sqlx::query(&sql)
        .bind(limit)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter().map(pending_vector_from_row).collect()
}

pub async fn mark_pending_vector_done(tx: &mut Tx<'_>, id: uuid::Uuid) -> MemcoreResult<()> {
    sqlx::query("UPDATE pending_vectors SET status = 'done' WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(to_storage_err)?;
    Ok(())
}

pub async fn mark_pending_vector_retry(
    tx: &mut Tx<'_>,
    id: uuid::Uuid,
    next_run_at: DateTime<Utc>,
    error: &str,
) -> MemcoreResult<()> {
    sqlx::query(
        "UPDATE pending_vectors \
         SET status = 'retry', attempt_count = attempt_count + 1, next_run_at = $2, last_error = $3 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(next_run_at)
    .bind(error)
    .execute(&mut **tx)
    .await
    .map_err(to_storage_err)?;
    Ok(())
}

/// Last-resort fallback when even `pending_vectors` can't absorb a write
/// (e.g. storage itself is degraded) — park the raw payload for manual or
/// batch replay (§4.8 step 7).
pub async fn insert_memory_backlog(
    tx: &mut Tx<'_>,
    payload: &serde_json::Value,
    reason: &str,
) -> MemcoreResult<uuid::Uuid> {
    let id = uuid::Uuid::new_v4();
    sqlx::query("INSERT INTO memory_backlog (id, payload, reason, created_at) VALUES ($1, $2, $3, now())")
        .bind(id)
        .bind(payload)
        .bind(reason)
        .execute(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    Ok(id)
}
