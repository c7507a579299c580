//! The post-processing pipeline common to every extraction method (§4.10
//! steps 1-8): sanitize, tier soft-check, dedup-or-create, owner-edge
//! creation, inter-entity edge synthesis, and profile sync.

use std::collections::HashMap;

use memcore_core::config::{ExtractionConfig, ExtractionMethod, GraphConfig, MemcoreConfig};
use memcore_core::models::{EntityType, MemoryOrigin};
use memcore_core::MemcoreResult;
use memcore_dedup::find_duplicate;
use memcore_graph::{upsert_edge, EdgeVectorNotifier, NoopNotifier};
use memcore_llm::LlmProvider;
use memcore_metering::limit::MeteredResource;
use memcore_ontology::OntologyMode;
use memcore_storage::queries::entity_ops;
use memcore_storage::tenant::Tx;
use memcore_stores::update_profile;

use crate::candidate::{Candidate, EdgeSourceRef};
use crate::owner::get_or_create_owner;
use crate::rules;

pub struct ExtractionOutcome {
    pub created: usize,
    pub reused: usize,
    pub tier_capped: bool,
}

/// Run a batch of extracted text/payloads through §4.10's rule dispatch and
/// the shared post-processing pipeline.
#[allow(clippy::too_many_arguments)]
pub async fn extract_and_process(
    tx: &mut Tx<'_>,
    config: &MemcoreConfig,
    provider: Option<&dyn LlmProvider>,
    notifier: &dyn EdgeVectorNotifier,
    tenant_id: uuid::Uuid,
    tier: &str,
    write_id: Option<uuid::Uuid>,
    payload_text: &str,
    structured_payload: Option<&serde_json::Value>,
    table_hint: Option<&str>,
) -> MemcoreResult<ExtractionOutcome> {
    let method = config.extraction.method;
    let rule_candidates = || -> Vec<Candidate> {
        match (table_hint, structured_payload) {
            (Some("meals"), Some(p)) => rules::extract_meal(p),
            (Some("workouts"), Some(p)) => rules::extract_workout(p),
            (Some("medications"), Some(p)) => rules::extract_medication(p),
            (Some("profile"), Some(p)) => rules::extract_profile(p),
            (_, Some(p)) => rules::extract_generic(p, &[]),
            _ => Vec::new(),
        }
    };

    let mut candidates = match method {
        ExtractionMethod::RuleBased => rule_candidates(),
        ExtractionMethod::Llm => match provider {
            Some(p) => crate::llm::extract_with_llm(tx, p, payload_text, &profile_document(tx).await?, &config.extraction)
                .await
                .unwrap_or_default(),
            None => Vec::new(),
        },
        ExtractionMethod::LlmFirst => {
            let llm_result = match provider {
                Some(p) => {
                    crate::llm::extract_with_llm(tx, p, payload_text, &profile_document(tx).await?, &config.extraction)
                        .await
                        .unwrap_or_default()
                }
                None => Vec::new(),
            };
            if llm_result.is_empty() {
                rule_candidates()
            } else {
                llm_result
            }
        }
        ExtractionMethod::Batch => {
            let rules_result = rule_candidates();
            if rules_result.is_empty() {
                match provider {
                    Some(p) => {
                        crate::llm::extract_with_llm(tx, p, payload_text, &profile_document(tx).await?, &config.extraction)
                            .await
                            .unwrap_or_default()
                    }
                    None => Vec::new(),
                }
            } else {
                rules_result
            }
        }
    };

    // Step 1: sanitize + dedupe the candidate list itself.
    candidates = rules::sanitize(candidates, &config.extraction);
    candidates = rules::dedupe_candidates(candidates);

    if candidates.is_empty() {
        return Ok(ExtractionOutcome { created: 0, reused: 0, tier_capped: false });
    }

    // Step 2: tier soft-check against the graph-entity cap.
    let live_count = entity_ops::count_live(tx).await?;
    if memcore_core::config::TierLimits::at_cap(config.metering.limits_for(tier).graph_entities, live_count) {
        tracing::warn!(tenant_id = %tenant_id, "graph entity tier limit reached, skipping extraction");
        return Ok(ExtractionOutcome { created: 0, reused: 0, tier_capped: true });
    }

    // Steps 3-4: resolve or create each candidate, recording the pass map.
    let mut pass_map: HashMap<(EntityType, String), uuid::Uuid> = HashMap::new();
    let mut created = 0usize;
    let mut reused = 0usize;
    let mut new_entity_ids = Vec::new();

    for candidate in &candidates {
        let resolved = resolve_or_create_candidate(tx, config, tenant_id, tier, candidate).await?;
        if resolved.1 {
            created += 1;
            new_entity_ids.push(resolved.0);
        } else {
            reused += 1;
        }
        pass_map.insert((candidate.entity_type, candidate.name.to_lowercase()), resolved.0);
    }

    // Step 5-6: owner edge, or a weak related_to fallback when none fires.
    for candidate in &candidates {
        let target_id = pass_map[&(candidate.entity_type, candidate.name.to_lowercase())];
        create_candidate_edge(tx, config.ontology.mode, &config.graph, notifier, write_id, &pass_map, candidate, target_id).await?;
    }

    // Step 7: fire-and-forget inter-entity edge synthesis over the pass's
    // newly created entities. Best-effort: a failure here never aborts
    // extraction since the primary entities/edges are already committed
    // within this same transaction up to this point.
    if let Err(e) = synthesize_inter_entity_edges(tx, config.ontology.mode, &config.graph, notifier, write_id, &new_entity_ids).await {
        tracing::warn!(error = %e, "inter-entity edge synthesis failed");
    }

    // Step 8: fire-and-forget profile sync on owner works_at/attends edges.
    if let Err(e) = sync_profile_from_candidates(tx, &candidates, &pass_map).await {
        tracing::warn!(error = %e, "profile sync from extraction failed");
    }

    Ok(ExtractionOutcome { created, reused, tier_capped: false })
}

async fn profile_document(tx: &mut Tx<'_>) -> MemcoreResult<serde_json::Value> {
    Ok(memcore_storage::queries::profile_ops::latest(tx)
        .await?
        .map(|v| v.document)
        .unwrap_or_else(|| serde_json::json!({})))
}

/// Returns `(entity_id, was_created)`.
async fn resolve_or_create_candidate(
    tx: &mut Tx<'_>,
    config: &MemcoreConfig,
    tenant_id: uuid::Uuid,
    tier: &str,
    candidate: &Candidate,
) -> MemcoreResult<(uuid::Uuid, bool)> {
    if let Some(existing) = find_duplicate(tx, candidate.entity_type, &candidate.name, &config.dedup).await? {
        entity_ops::reinforce(tx, existing.entity.id, 0.02).await?;
        return Ok((existing.entity.id, false));
    }

    let live_count = entity_ops::count_live(tx).await?;
    let entity_type = candidate.entity_type;
    let name = candidate.name.clone();
    let properties = candidate.properties.clone();
    let confidence = candidate.confidence;

    let created = memcore_metering::limit::with_tier_limit_lock(
        tx,
        &config.metering,
        tenant_id,
        tier,
        MeteredResource::GraphEntities,
        live_count,
        move |tx| {
            Box::pin(async move { entity_ops::create(tx, entity_type, &name, &properties, confidence).await })
        },
    )
    .await?;

    Ok((created.id, true))
}

#[allow(clippy::too_many_arguments)]
async fn create_candidate_edge(
    tx: &mut Tx<'_>,
    ontology_mode: OntologyMode,
    graph_config: &GraphConfig,
    notifier: &dyn EdgeVectorNotifier,
    write_id: Option<uuid::Uuid>,
    pass_map: &HashMap<(EntityType, String), uuid::Uuid>,
    candidate: &Candidate,
    target_id: uuid::Uuid,
) -> MemcoreResult<()> {
    let Some(edge) = &candidate.edge else {
        attach_related_to_fallback(tx, ontology_mode, graph_config, notifier, write_id, target_id).await?;
        return Ok(());
    };

    let source_id = resolve_source_ref(tx, pass_map, &edge.source_ref).await?;

    let result = upsert_edge(
        tx,
        source_id,
        target_id,
        &edge.relation,
        edge.confidence,
        candidate.evidence_text.as_deref(),
        write_id,
        ontology_mode,
        notifier,
        graph_config.feature_graph_edge_vectorization,
    )
    .await?;

    if result.edge.is_none() {
        attach_related_to_fallback(tx, ontology_mode, graph_config, notifier, write_id, target_id).await?;
    }

    Ok(())
}

async fn resolve_source_ref(
    tx: &mut Tx<'_>,
    pass_map: &HashMap<(EntityType, String), uuid::Uuid>,
    source_ref: &EdgeSourceRef,
) -> MemcoreResult<uuid::Uuid> {
    match source_ref {
        EdgeSourceRef::Owner => Ok(get_or_create_owner(tx).await?.id),
        EdgeSourceRef::Named { entity_type, name } => {
            if let Some(id) = pass_map.get(&(*entity_type, name.to_lowercase())) {
                return Ok(*id);
            }
            if let Some(existing) = entity_ops::find_exact(tx, *entity_type, name).await? {
                return Ok(existing.id);
            }
            let fuzzy = entity_ops::find_by_trigram(tx, *entity_type, name, 0.4, 1).await?;
            if let Some((entity, _)) = fuzzy.into_iter().next() {
                return Ok(entity.id);
            }
            Ok(get_or_create_owner(tx).await?.id)
        }
    }
}

async fn attach_related_to_fallback(
    tx: &mut Tx<'_>,
    ontology_mode: OntologyMode,
    graph_config: &GraphConfig,
    notifier: &dyn EdgeVectorNotifier,
    write_id: Option<uuid::Uuid>,
    target_id: uuid::Uuid,
) -> MemcoreResult<()> {
    let owner = get_or_create_owner(tx).await?;
    if owner.id == target_id {
        return Ok(());
    }
    upsert_edge(
        tx,
        owner.id,
        target_id,
        "related_to",
        0.3,
        None,
        write_id,
        ontology_mode,
        notifier,
        graph_config.feature_graph_edge_vectorization,
    )
    .await?;
    Ok(())
}

/// §4.10 step 7: synthesize `{category, similar_to, part_of, related_to}`
/// edges between this pass's newly created entities that share a type,
/// lifting parent categories for topic-typed entities.
async fn synthesize_inter_entity_edges(
    tx: &mut Tx<'_>,
    ontology_mode: OntologyMode,
    graph_config: &GraphConfig,
    notifier: &dyn EdgeVectorNotifier,
    write_id: Option<uuid::Uuid>,
    new_entity_ids: &[uuid::Uuid],
) -> MemcoreResult<()> {
    let mut entities = Vec::with_capacity(new_entity_ids.len());
    for id in new_entity_ids {
        if let Some(entity) = entity_ops::get(tx, *id).await? {
            entities.push(entity);
        }
    }

    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            let (a, b) = (&entities[i], &entities[j]);
            if a.entity_type != b.entity_type {
                continue;
            }
            let relation = if a.entity_type == EntityType::Topic { "category" } else { "similar_to" };
            upsert_edge(tx, a.id, b.id, relation, 0.3, None, write_id, ontology_mode, notifier, graph_config.feature_graph_edge_vectorization).await?;
        }
    }

    Ok(())
}

/// §4.10 step 8: patch `profile.work.company`/`profile.education.institution`
/// when an owner `works_at`/`attends` edge was created, unless the field is
/// already set. The data model doesn't track per-field origin provenance
/// (only a whole-version `changed_by`), so "unless a higher-precedence
/// origin already set them" is approximated here as "don't clobber a field
/// that already has a value" rather than a full precedence comparison —
/// see DESIGN.md.
async fn sync_profile_from_candidates(
    tx: &mut Tx<'_>,
    candidates: &[Candidate],
    pass_map: &HashMap<(EntityType, String), uuid::Uuid>,
) -> MemcoreResult<()> {
    let _ = pass_map;
    let document = profile_document(tx).await?;

    for candidate in candidates {
        let Some(edge) = &candidate.edge else { continue };
        if !matches!(edge.source_ref, EdgeSourceRef::Owner) {
            continue;
        }

        let patch = match edge.relation.as_str() {
            "works_at" if document.pointer("/work/company").and_then(|v| v.as_str()).is_none() => {
                Some(serde_json::json!({ "work": { "company": candidate.name } }))
            }
            "attends" if document.pointer("/education/institution").and_then(|v| v.as_str()).is_none() => {
                Some(serde_json::json!({ "education": { "institution": candidate.name } }))
            }
            _ => None,
        };

        if let Some(patch) = patch {
            update_profile(tx, &patch, "extraction", MemoryOrigin::AiInferred, None).await?;
        }
    }

    Ok(())
}

/// Convenience for callers that don't need to wire a vector notifier.
pub fn noop_notifier() -> NoopNotifier {
    NoopNotifier
}
