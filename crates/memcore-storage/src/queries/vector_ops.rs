//! The Vector store (§3, §4.7): embedded memories with nearest-neighbor
//! search over `pgvector`'s HNSW cosine index.

use memcore_core::models::VectorRow;
use memcore_core::MemcoreResult;
use pgvector::Vector;
use sqlx::Row as _;

use crate::tenant::Tx;
use crate::to_storage_err;

const SELECT_COLUMNS: &str =
    "id, collection, text, embedding, metadata, meta_id, created_at, deleted_at";

fn from_row(row: sqlx::postgres::PgRow) -> MemcoreResult<VectorRow> {
    let embedding: Vector = row.try_get("embedding").map_err(to_storage_err)?;
    Ok(VectorRow {
        id: row.try_get("id").map_err(to_storage_err)?,
        collection: row.try_get("collection").map_err(to_storage_err)?,
        text: row.try_get("text").map_err(to_storage_err)?,
        embedding: embedding.to_vec(),
        metadata: row.try_get("metadata").map_err(to_storage_err)?,
        meta_id: row.try_get("meta_id").map_err(to_storage_err)?,
        created_at: row.try_get("created_at").map_err(to_storage_err)?,
        deleted_at: row.try_get("deleted_at").map_err(to_storage_err)?,
    })
}

pub async fn insert(
    tx: &mut Tx<'_>,
    collection: &str,
    text: &str,
    embedding: &[f32],
    metadata: &serde_json::Value,
    meta_id: uuid::Uuid,
) -> MemcoreResult<VectorRow> {
    sqlx::query(
        "INSERT INTO _vector_collections (name, dimensions, created_at) VALUES ($1, $2, now()) \
         ON CONFLICT (name) DO NOTHING",
    )
    .bind(collection)
    .bind(embedding.len() as i32)
    .execute(&mut **tx)
    .await
    .map_err(to_storage_err)?;

    let id = uuid::Uuid::new_v4();
    let vector = Vector::from(embedding.to_vec());
    let sql = format!(
        "INSERT INTO vectors (id, collection, text, embedding, metadata, meta_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, now()) \
         RETURNING {SELECT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(collection)
        .bind(text)
        .bind(vector)
        .bind(metadata)
        .bind(meta_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    from_row(row)
}

pub async fn get(tx: &mut Tx<'_>, id: uuid::Uuid) -> MemcoreResult<Option<VectorRow>> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM vectors WHERE id = $1 AND deleted_at IS NULL");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    row.map(from_row).transpose()
}

pub async fn soft_delete(tx: &mut Tx<'_>, id: uuid::Uuid) -> MemcoreResult<()> {
    sqlx::query("UPDATE vectors SET deleted_at = now() WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(to_storage_err)?;
    Ok(())
}

/// Approximate nearest-neighbor search within one collection, ordered by
/// cosine distance ascending (most similar first).
pub async fn search(
    tx: &mut Tx<'_>,
    collection: &str,
    query_embedding: &[f32],
    limit: i64,
) -> MemcoreResult<Vec<(VectorRow, f64)>> {
    let vector = Vector::from(query_embedding.to_vec());
    let sql = format!(
        "SELECT {SELECT_COLUMNS}, (embedding <=> $1) AS distance FROM vectors \
         WHERE collection = $2 AND deleted_at IS NULL \
         ORDER BY embedding <=> $1 LIMIT $3"
    );
    let rows = sqlx::query(&sql)
        .bind(vector)
        .bind(collection)
        .bind(limit)
        .fetch_all(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    rows.into_iter()
        .map(|row| {
            let distance: f64 = row.try_get("distance").map_err(to_storage_err)?;
            from_row(row).map(|v| (v, distance))
        })
        .collect::<MemcoreResult<Vec<_>>>()
}

/// Exact-duplicate check by normalized text, used by the dedup engine
/// (§4.5 stage 1) before embedding a new vector write.
pub async fn find_by_exact_text(
    tx: &mut Tx<'_>,
    collection: &str,
    normalized_text: &str,
) -> MemcoreResult<Option<VectorRow>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM vectors \
         WHERE collection = $1 AND lower(text) = lower($2) AND deleted_at IS NULL LIMIT 1"
    );
    let row = sqlx::query(&sql)
        .bind(collection)
        .bind(normalized_text)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    row.map(from_row).transpose()
}

pub async fn mark_collection_dimensions(
    tx: &mut Tx<'_>,
    collection: &str,
) -> MemcoreResult<Option<i32>> {
    let row = sqlx::query("SELECT dimensions FROM _vector_collections WHERE name = $1")
        .bind(collection)
        .fetch_optional(&mut **tx)
        .await
        .map_err(to_storage_err)?;

    row.map(|r| r.try_get::<i32, _>("dimensions").map_err(to_storage_err))
        .transpose()
}
