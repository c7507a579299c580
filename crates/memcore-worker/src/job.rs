//! Running a single claimed job (§4.9): dispatch on `JobTarget`, feeding
//! the stored content back through extraction or embedding.

use memcore_core::config::MemcoreConfig;
use memcore_core::models::JobTarget;
use memcore_core::MemcoreResult;
use memcore_extraction::{extract_and_process, noop_notifier};
use memcore_llm::{EmbeddingProvider, LlmProvider};
use memcore_storage::queries::{table_ops, vector_ops};
use memcore_storage::tenant::Tx;

/// Re-run extraction (and, for vectors, nothing further — the text is
/// already embedded) against the content a queued job points at.
pub async fn run_enrichment_job(
    tx: &mut Tx<'_>,
    config: &MemcoreConfig,
    llm_provider: Option<&dyn LlmProvider>,
    tenant_id: uuid::Uuid,
    tier: &str,
    write_id: uuid::Uuid,
    target: &JobTarget,
) -> MemcoreResult<()> {
    let notifier = noop_notifier();

    match target {
        JobTarget::Profile { version } => {
            let Some(profile_version) = memcore_storage::queries::profile_ops::get_version(tx, *version).await? else {
                return Ok(());
            };
            let payload_text = profile_version.document.to_string();
            extract_and_process(
                tx,
                config,
                llm_provider,
                &notifier,
                tenant_id,
                tier,
                Some(write_id),
                &payload_text,
                Some(&profile_version.document),
                Some("profile"),
            )
            .await?;
        }

        JobTarget::Table { table, row_id } => {
            let Some(row) = table_ops::get_row(tx, table, *row_id).await? else {
                return Ok(());
            };
            let fields_value = serde_json::Value::Object(row.fields.clone());
            let payload_text = fields_value.to_string();
            extract_and_process(
                tx,
                config,
                llm_provider,
                &notifier,
                tenant_id,
                tier,
                Some(write_id),
                &payload_text,
                Some(&fields_value),
                Some(table.as_str()),
            )
            .await?;
        }

        JobTarget::Vector { row_id, .. } => {
            let Some(row) = vector_ops::get(tx, *row_id).await? else {
                return Ok(());
            };
            extract_and_process(
                tx,
                config,
                llm_provider,
                &notifier,
                tenant_id,
                tier,
                Some(write_id),
                &row.text,
                None,
                None,
            )
            .await?;
        }

        JobTarget::PendingVector { .. } => {
            // Handled by the separate pending-vector retry loop, never
            // enqueued as a regular enrichment_jobs row.
        }
    }

    Ok(())
}

/// Promote a pending vector once an embedding provider is available
/// again (§4.8 step 7, §4.9): embed the parked text and insert it for
/// real, then enqueue a follow-up enrichment job over the new row.
pub async fn retry_pending_vector(
    tx: &mut Tx<'_>,
    embedding_provider: &dyn EmbeddingProvider,
    pending: &memcore_core::models::PendingVector,
) -> MemcoreResult<memcore_core::models::EnrichmentJob> {
    use memcore_stores::{insert_vector_text, VectorWriteOutcome};

    let outcome = insert_vector_text(
        tx,
        embedding_provider,
        &pending.collection,
        &pending.text,
        &pending.metadata,
        memcore_core::models::MemoryOrigin::System,
    )
    .await?;

    let row_id = match outcome {
        VectorWriteOutcome::Created { row, .. } => row.id,
        VectorWriteOutcome::Mentioned { row } => row.id,
        VectorWriteOutcome::Contradicted { row, .. } => row.id,
    };

    let target = JobTarget::Vector { collection: pending.collection.clone(), row_id };
    memcore_storage::queries::enrichment_ops::enqueue(
        tx,
        uuid::Uuid::new_v4(),
        &target,
        &serde_json::json!({ "kind": "pending_vector_promotion", "pending_id": pending.id }),
    )
    .await
}
