//! LLM extraction (§4.10): assemble the schema-constrained prompt with
//! temporal anchors, a profile digest, and the existing-entity digest,
//! then translate the provider's strict JSON response into candidates.

use chrono::{Datelike, Duration, Utc};
use memcore_core::config::ExtractionConfig;
use memcore_core::models::EntityType;
use memcore_llm::{ExtractedEntity, LlmProvider, LlmResult};
use memcore_storage::queries::{edge_ops, entity_ops};
use memcore_storage::tenant::Tx;
use once_cell::sync::Lazy;

use crate::candidate::{Candidate, EdgeSourceRef};

static EXTRACTION_SCHEMA: Lazy<serde_json::Value> = Lazy::new(|| {
    serde_json::json!({
        "type": "object",
        "properties": {
            "entities": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "type": { "type": "string" },
                        "properties": { "type": "object" },
                        "edge": {
                            "type": "object",
                            "properties": {
                                "relation": { "type": "string" },
                                "source_ref": { "type": "string" },
                                "confidence": { "type": "number" }
                            },
                            "required": ["relation"]
                        }
                    },
                    "required": ["name", "type"]
                }
            }
        },
        "required": ["entities"]
    })
});

fn temporal_anchors() -> serde_json::Value {
    let now = Utc::now();
    let today = now.date_naive();
    serde_json::json!({
        "today": today.to_string(),
        "yesterday": (today - Duration::days(1)).to_string(),
        "next_month": (today + Duration::days(30)).to_string(),
        "day_of_week": today.weekday().to_string(),
    })
}

fn profile_digest(profile_document: &serde_json::Value, max_chars: usize) -> String {
    let full = serde_json::to_string(profile_document).unwrap_or_default();
    if full.chars().count() <= max_chars {
        full
    } else {
        full.chars().take(max_chars).collect()
    }
}

async fn top_entity_digest(tx: &mut Tx<'_>, limit: i64) -> memcore_core::MemcoreResult<Vec<serde_json::Value>> {
    let entities = entity_ops::top_by_mention(tx, limit).await?;
    let mut digest = Vec::with_capacity(entities.len());
    for entity in entities {
        let relation = edge_ops::dominant_relation_for(tx, entity.id).await?;
        digest.push(serde_json::json!({
            "name": entity.name,
            "type": entity.entity_type.as_str(),
            "mention_count": entity.mention_count,
            "dominant_relation": relation,
        }));
    }
    Ok(digest)
}

pub fn user_prompt(
    payload_text: &str,
    profile_document: &serde_json::Value,
    existing_entities: &[serde_json::Value],
    config: &ExtractionConfig,
) -> String {
    let anchors = temporal_anchors();
    let digest = profile_digest(profile_document, config.profile_digest_max_chars);
    format!(
        "temporal_anchors: {anchors}\nprofile_digest: {digest}\nexisting_entities: {}\n\ntext:\n{payload_text}",
        serde_json::to_string(existing_entities).unwrap_or_default()
    )
}

const SYSTEM_PROMPT: &str = "Extract entities and relations mentioned in the user's text. \
Return strict JSON matching the provided schema. Only extract what is explicitly stated. \
When a statement is about someone other than the account owner (e.g. \"Sarah likes sushi\"), \
set edge.source_ref to that person's name instead of leaving it unset.";

/// Run one LLM extraction call and assemble the full prompt from
/// tenant-local context (§4.10).
pub async fn extract_with_llm(
    tx: &mut Tx<'_>,
    provider: &dyn LlmProvider,
    payload_text: &str,
    profile_document: &serde_json::Value,
    config: &ExtractionConfig,
) -> LlmResult<Vec<Candidate>> {
    let existing = top_entity_digest(tx, config.top_entities_for_prompt as i64)
        .await
        .map_err(|e| memcore_llm::LlmError::Request(e.to_string()))?;
    let prompt = user_prompt(payload_text, profile_document, &existing, config);

    let response = provider.extract(SYSTEM_PROMPT, &prompt, &EXTRACTION_SCHEMA).await?;
    Ok(response.entities.into_iter().map(to_candidate).collect())
}

fn to_candidate(entity: ExtractedEntity) -> Candidate {
    let entity_type = EntityType::parse(&entity.entity_type).unwrap_or(EntityType::Custom);
    let mut candidate = Candidate::new(entity_type, entity.name, 0.4).with_properties(entity.properties);

    if let Some(edge) = entity.edge {
        let source_ref = match edge.source_ref {
            Some(name) => EdgeSourceRef::Named { entity_type, name },
            None => EdgeSourceRef::Owner,
        };
        candidate.confidence = edge.confidence;
        candidate = candidate.with_edge(edge.relation, source_ref);
    }

    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_digest_truncates_to_max_chars() {
        let doc = serde_json::json!({ "name": "a".repeat(100) });
        let digest = profile_digest(&doc, 20);
        assert_eq!(digest.chars().count(), 20);
    }

    #[test]
    fn to_candidate_without_source_ref_defaults_to_owner() {
        let entity = ExtractedEntity {
            name: "sushi".into(),
            entity_type: "food".into(),
            properties: serde_json::json!({}),
            edge: Some(memcore_llm::ExtractedEdge { relation: "ate".into(), source_ref: None, confidence: 0.6 }),
        };
        let candidate = to_candidate(entity);
        assert!(matches!(candidate.edge.unwrap().source_ref, EdgeSourceRef::Owner));
    }

    #[test]
    fn to_candidate_with_source_ref_names_the_non_owner_entity() {
        let entity = ExtractedEntity {
            name: "sushi".into(),
            entity_type: "food".into(),
            properties: serde_json::json!({}),
            edge: Some(memcore_llm::ExtractedEdge { relation: "ate".into(), source_ref: Some("Sarah".into()), confidence: 0.6 }),
        };
        let candidate = to_candidate(entity);
        match candidate.edge.unwrap().source_ref {
            EdgeSourceRef::Named { name, .. } => assert_eq!(name, "Sarah"),
            EdgeSourceRef::Owner => panic!("expected named source ref"),
        }
    }
}
