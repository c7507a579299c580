//! The Vector store (§4.7): embeds text via an external provider,
//! dedupes exact (case-insensitive) text within a collection, and emits
//! access events on search hits.

use memcore_core::models::{MemoryMeta, MemoryOrigin, SourceRef, SourceType, VectorRow};
use memcore_core::{MemcoreError, MemcoreResult};
use memcore_llm::EmbeddingProvider;
use memcore_storage::queries::{memory_meta_ops, vector_ops};
use memcore_storage::tenant::Tx;

const DEFAULT_SEARCH_THRESHOLD: f64 = 0.7;
const DEFAULT_SEARCH_LIMIT: i64 = 10;

pub enum VectorWriteOutcome {
    Created { row: VectorRow, meta: MemoryMeta },
    /// Identical text already existed in the collection; the existing
    /// meta row received a `mention` (access) event instead of a new row.
    Mentioned { row: VectorRow },
    /// Same text, different metadata — a contradiction against the
    /// existing row's meta.
    Contradicted { row: VectorRow, meta: MemoryMeta },
}

/// Embed `text` and insert it, unless an identical (case-insensitive)
/// text already lives in `collection`.
pub async fn insert_text(
    tx: &mut Tx<'_>,
    provider: &dyn EmbeddingProvider,
    collection: &str,
    text: &str,
    metadata: &serde_json::Value,
    origin: MemoryOrigin,
) -> MemcoreResult<VectorWriteOutcome> {
    if let Some(existing) = vector_ops::find_by_exact_text(tx, collection, text).await? {
        return Ok(if existing.metadata == *metadata {
            if let Some(m) = resolve_meta(tx, &existing).await? {
                memory_meta_ops::record_access(tx, m.id).await?;
            }
            VectorWriteOutcome::Mentioned { row: existing }
        } else {
            let meta = memory_meta_ops::create(
                tx,
                SourceType::Vector,
                &SourceRef::Vector { collection: collection.to_string(), row_id: existing.id },
                MemoryOrigin::System,
            )
            .await?;
            memory_meta_ops::append_contradiction(tx, meta.id, existing.meta_id).await?;
            VectorWriteOutcome::Contradicted { row: existing, meta }
        });
    }

    let embedding = provider
        .embed(text)
        .await
        .map_err(|e| MemcoreError::Transient(e.to_string()))?;

    let meta = memory_meta_ops::create(
        tx,
        SourceType::Vector,
        &SourceRef::Vector { collection: collection.to_string(), row_id: uuid::Uuid::nil() },
        origin,
    )
    .await?;

    let row = vector_ops::insert(tx, collection, text, &embedding, metadata, meta.id).await?;
    Ok(VectorWriteOutcome::Created { row, meta })
}

async fn resolve_meta(tx: &mut Tx<'_>, row: &VectorRow) -> MemcoreResult<Option<MemoryMeta>> {
    memory_meta_ops::get(tx, row.meta_id).await
}

pub struct SearchHit {
    pub row: VectorRow,
    pub distance: f64,
    pub meta: Option<MemoryMeta>,
}

/// Cosine-threshold search, joined with each hit's meta row, emitting an
/// access event per result.
pub async fn search(
    tx: &mut Tx<'_>,
    provider: &dyn EmbeddingProvider,
    collection: &str,
    query_text: &str,
    threshold: Option<f64>,
    limit: Option<i64>,
) -> MemcoreResult<Vec<SearchHit>> {
    let query_embedding = provider
        .embed(query_text)
        .await
        .map_err(|e| MemcoreError::Transient(e.to_string()))?;

    let threshold = threshold.unwrap_or(DEFAULT_SEARCH_THRESHOLD);
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    let candidates = vector_ops::search(tx, collection, &query_embedding, limit).await?;

    let mut hits = Vec::new();
    for (row, distance) in candidates {
        // pgvector's `<=>` is cosine *distance*; similarity is `1 - distance`.
        let similarity = 1.0 - distance;
        if similarity < threshold {
            continue;
        }
        let meta = memory_meta_ops::get(tx, row.meta_id).await?;
        if let Some(ref m) = meta {
            memory_meta_ops::record_access(tx, m.id).await?;
        }
        hits.push(SearchHit { row, distance, meta });
    }

    Ok(hits)
}
