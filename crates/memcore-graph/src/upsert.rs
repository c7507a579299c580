//! The edge-creation contract (§4.6): resolve endpoints, normalize the
//! relation, consult the ontology, handle temporal transitions, then
//! upsert by `(source, target, relation)`.

use memcore_core::models::{Edge, EntityType, MemoryOrigin, SourceRef, SourceType};
use memcore_core::{MemcoreError, MemcoreResult};
use memcore_ontology::{normalize_relation, validate_relation, OntologyMode};
use memcore_storage::queries::{edge_ops, entity_ops, memory_meta_ops};
use memcore_storage::tenant::Tx;

/// Fired after a successful upsert so a caller can mirror a short text
/// summary into the vector store's `graph_edges` collection. Never blocks
/// edge creation — callers that can't embed synchronously should enqueue
/// instead of awaiting here.
#[async_trait::async_trait]
pub trait EdgeVectorNotifier: Send + Sync {
    async fn notify(&self, summary: &str) -> MemcoreResult<()>;
}

pub struct NoopNotifier;

#[async_trait::async_trait]
impl EdgeVectorNotifier for NoopNotifier {
    async fn notify(&self, _summary: &str) -> MemcoreResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Reinforced,
    Rejected,
}

pub struct EdgeUpsertResult {
    pub outcome: UpsertOutcome,
    pub edge: Option<Edge>,
}

/// Create or reinforce an edge per the §4.6 contract. `relation` is the
/// raw, possibly LLM-invented relation string; it is normalized before any
/// ontology or storage lookup.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_edge(
    tx: &mut Tx<'_>,
    source_id: uuid::Uuid,
    target_id: uuid::Uuid,
    raw_relation: &str,
    confidence: f64,
    evidence_text: Option<&str>,
    write_id: Option<uuid::Uuid>,
    ontology_mode: OntologyMode,
    notifier: &dyn EdgeVectorNotifier,
    vectorization_enabled: bool,
) -> MemcoreResult<EdgeUpsertResult> {
    let source = entity_ops::get(tx, source_id)
        .await?
        .filter(|e| e.deleted_at.is_none())
        .ok_or_else(|| MemcoreError::NotFound { kind: "entity".into(), id: source_id.to_string() })?;
    let target = entity_ops::get(tx, target_id)
        .await?
        .filter(|e| e.deleted_at.is_none())
        .ok_or_else(|| MemcoreError::NotFound { kind: "entity".into(), id: target_id.to_string() })?;

    let relation = normalize_relation(raw_relation);

    let outcome = validate_relation(ontology_mode, &relation, source.entity_type, target.entity_type);
    if !outcome.valid {
        return Ok(EdgeUpsertResult { outcome: UpsertOutcome::Rejected, edge: None });
    }
    let quarantined = outcome.quarantine;
    if quarantined {
        edge_ops::quarantine(tx, source_id, target_id, &relation, "ontology_quarantine").await?;
    }

    let edge = match edge_ops::find_triple(tx, source_id, target_id, &relation).await? {
        Some(existing) => {
            let reinforced = edge_ops::reinforce(tx, existing.id, evidence_text, write_id).await?;
            EdgeUpsertResult { outcome: UpsertOutcome::Reinforced, edge: Some(reinforced) }
        }
        None => {
            let meta = memory_meta_ops::create(
                tx,
                SourceType::Edge,
                &SourceRef::Edge { edge_id: uuid::Uuid::nil() },
                MemoryOrigin::AiInferred,
            )
            .await?;
            let created =
                edge_ops::create(tx, source_id, target_id, &relation, confidence, evidence_text, write_id, meta.id)
                    .await?;
            EdgeUpsertResult { outcome: UpsertOutcome::Created, edge: Some(created) }
        }
    };

    if vectorization_enabled {
        if let Some(ref e) = edge.edge {
            let summary = format!("{} {} {}", source.name, e.relation, target.name);
            if let Err(err) = notifier.notify(&summary).await {
                tracing::warn!(error = %err, "graph edge vectorization notify failed");
            }
        }
    }

    Ok(edge)
}

/// Entity types accepted for a relation, used by callers validating before
/// they even have both endpoints resolved (e.g. extraction candidate
/// filtering).
pub fn is_type_pair_allowed(relation: &str, source_type: EntityType, target_type: EntityType) -> bool {
    let allowed_source = memcore_ontology::allowed_source_types(relation);
    let allowed_target = memcore_ontology::allowed_target_types(relation);
    let source_ok = allowed_source.map(|types| types.contains(&source_type)).unwrap_or(true);
    let target_ok = allowed_target.map(|types| types.contains(&target_type)).unwrap_or(true);
    source_ok && target_ok
}
