//! The write-ingestion pipeline (§4.8): consent, write-id, persist,
//! ledger, audit, enqueue — with the vector-write degraded fallback chain.

use std::time::Instant;

use memcore_core::models::{JobTarget, Permission, PipelineStage, Subject};
use memcore_core::{MemcoreConfig, MemcoreResult};
use memcore_consent::require_consent;
use memcore_llm::EmbeddingProvider;
use memcore_storage::queries::{audit_ops, claim_ops, enrichment_ops};
use memcore_storage::tenant::Tx;
use memcore_stores::{insert_table_row, insert_vector_text, update_profile, VectorWriteOutcome};

use crate::degraded::{is_embedding_failure, is_missing_relation};
use crate::resource::{IngestRequest, WriteRequest, WriteStatus};

pub struct IngestOutcome {
    pub write_id: uuid::Uuid,
    pub status: WriteStatus,
}

/// Run one request through the full synchronous pipeline (§4.8): consent,
/// write id, persist, ledger, audit, enqueue.
pub async fn ingest(
    tx: &mut Tx<'_>,
    config: &MemcoreConfig,
    embedding_provider: Option<&dyn EmbeddingProvider>,
    request: IngestRequest,
) -> MemcoreResult<IngestOutcome> {
    require_consent(tx, &request.agent_id, &request.write.consent_resource(), Permission::Write).await?;

    let write_id = uuid::Uuid::new_v4();

    let status = match &request.write {
        WriteRequest::Profile { patch } => {
            let started = Instant::now();
            let outcome = update_profile(tx, patch, &request.changed_by, request.origin, None).await?;
            let source_ref = serde_json::json!({ "kind": "profile", "version": outcome.version });

            write_ledger_entry(tx, config, &request, &source_ref, write_id, "profile patch applied").await;
            emit_audit(tx, write_id, PipelineStage::ProfileWritten, Some(&source_ref), started).await;
            enqueue_enrichment(tx, write_id, JobTarget::Profile { version: outcome.version }, &source_ref).await;

            WriteStatus::Accepted
        }

        WriteRequest::Table { table_name, fields } => {
            let started = Instant::now();
            let outcome = insert_table_row(tx, table_name, fields, request.origin).await?;
            let source_ref = serde_json::json!({ "kind": "table", "table": table_name, "row_id": outcome.row.id });

            write_ledger_entry(tx, config, &request, &source_ref, write_id, "table row inserted").await;
            emit_audit(tx, write_id, PipelineStage::TableWritten, Some(&source_ref), started).await;
            enqueue_enrichment(
                tx,
                write_id,
                JobTarget::Table { table: table_name.clone(), row_id: outcome.row.id },
                &source_ref,
            )
            .await;

            WriteStatus::Accepted
        }

        WriteRequest::Vector { collection, text, metadata } => {
            return ingest_vector(tx, config, embedding_provider, &request, write_id, collection, text, metadata).await;
        }
    };

    Ok(IngestOutcome { write_id, status })
}

#[allow(clippy::too_many_arguments)]
async fn ingest_vector(
    tx: &mut Tx<'_>,
    config: &MemcoreConfig,
    embedding_provider: Option<&dyn EmbeddingProvider>,
    request: &IngestRequest,
    write_id: uuid::Uuid,
    collection: &str,
    text: &str,
    metadata: &serde_json::Value,
) -> MemcoreResult<IngestOutcome> {
    let started = Instant::now();

    let Some(provider) = embedding_provider else {
        return park_pending_vector(tx, write_id, collection, text, metadata, "no embedding provider configured").await;
    };

    match insert_vector_text(tx, provider, collection, text, metadata, request.origin).await {
        Ok(outcome) => {
            let (source_ref, meta_id) = match &outcome {
                VectorWriteOutcome::Created { row, meta } => {
                    (serde_json::json!({ "kind": "vector", "collection": collection, "row_id": row.id }), meta.id)
                }
                VectorWriteOutcome::Mentioned { row } => {
                    (serde_json::json!({ "kind": "vector", "collection": collection, "row_id": row.id }), row.meta_id)
                }
                VectorWriteOutcome::Contradicted { row, meta } => {
                    (serde_json::json!({ "kind": "vector", "collection": collection, "row_id": row.id }), meta.id)
                }
            };

            write_ledger_entry(tx, config, request, &source_ref, write_id, "vector text embedded").await;
            emit_audit(tx, write_id, PipelineStage::VectorWritten, Some(&source_ref), started).await;
            enqueue_enrichment(
                tx,
                write_id,
                JobTarget::Vector { collection: collection.to_string(), row_id: meta_id },
                &source_ref,
            )
            .await;

            Ok(IngestOutcome { write_id, status: WriteStatus::Accepted })
        }
        Err(e) if is_embedding_failure(&e) => park_pending_vector(tx, write_id, collection, text, metadata, &e.to_string()).await,
        Err(e) => Err(e),
    }
}

/// §4.8 step 7: embedding failed, so park the text in `pending_vectors`
/// for the enrichment worker to retry; if even that table is missing,
/// fall back to the last-resort `memory_backlog` table so nothing is lost.
async fn park_pending_vector(
    tx: &mut Tx<'_>,
    write_id: uuid::Uuid,
    collection: &str,
    text: &str,
    metadata: &serde_json::Value,
    reason: &str,
) -> MemcoreResult<IngestOutcome> {
    let meta_id = uuid::Uuid::new_v4();
    match enrichment_ops::enqueue_pending_vector(tx, collection, text, metadata, meta_id).await {
        Ok(pending) => {
            let source_ref = serde_json::json!({ "kind": "pending_vector", "collection": collection, "pending_id": pending.id });
            emit_audit(tx, write_id, PipelineStage::VectorPending, Some(&source_ref), Instant::now()).await;
            Ok(IngestOutcome { write_id, status: WriteStatus::PendingEnrichment })
        }
        Err(e) if is_missing_relation(&e) => {
            tracing::warn!("pending_vectors table missing, falling back to memory_backlog");
            let payload = serde_json::json!({ "collection": collection, "text": text, "metadata": metadata });
            enrichment_ops::insert_memory_backlog(tx, &payload, reason).await?;
            Ok(IngestOutcome { write_id, status: WriteStatus::PendingEnrichment })
        }
        Err(e) => Err(e),
    }
}

async fn write_ledger_entry(
    tx: &mut Tx<'_>,
    config: &MemcoreConfig,
    request: &IngestRequest,
    source_ref: &serde_json::Value,
    write_id: uuid::Uuid,
    evidence: &str,
) {
    if !config.ingestion.ledger_write_enabled {
        return;
    }

    let (claim_type, predicate, object) = match &request.write {
        WriteRequest::Profile { patch } => ("profile", "patched", patch.clone()),
        WriteRequest::Table { table_name, fields } => (table_name.as_str(), "inserted", fields.clone()),
        WriteRequest::Vector { collection, text, .. } => (collection.as_str(), "embedded", serde_json::json!(text)),
    };

    let result = claim_ops::insert(
        tx,
        claim_type,
        &Subject::Owner,
        predicate,
        &object,
        request.origin.initial_confidence(),
        "ingestion",
        request.origin,
        source_ref,
        write_id,
        &request.agent_id,
        &[evidence.to_string()],
    )
    .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, write_id = %write_id, "knowledge-claim ledger write failed, continuing");
    }
}

async fn emit_audit(
    tx: &mut Tx<'_>,
    write_id: uuid::Uuid,
    stage: PipelineStage,
    source_ref: Option<&serde_json::Value>,
    started: Instant,
) {
    let latency_ms = started.elapsed().as_millis() as i64;
    let result = audit_ops::record(tx, write_id, stage, source_ref, Some(latency_ms), true, &serde_json::json!({})).await;
    if let Err(e) = result {
        tracing::warn!(error = %e, write_id = %write_id, "audit write failed, continuing");
    }
}

async fn enqueue_enrichment(tx: &mut Tx<'_>, write_id: uuid::Uuid, target: JobTarget, source_ref: &serde_json::Value) {
    match enrichment_ops::enqueue(tx, write_id, &target, source_ref).await {
        Ok(_) => {
            emit_audit(tx, write_id, PipelineStage::EnrichmentQueued, Some(source_ref), Instant::now()).await;
        }
        Err(e) if is_missing_relation(&e) => {
            tracing::warn!("enrichment_jobs table missing, running in degraded mode without enqueue");
        }
        Err(e) => {
            tracing::warn!(error = %e, write_id = %write_id, "enrichment enqueue failed, continuing");
        }
    }
}
