//! The six-stage dedup pipeline (§4.5). Stages run in order; the first
//! one that produces a candidate wins — later stages never override an
//! earlier hit.

use memcore_core::config::DedupConfig;
use memcore_core::models::{Entity, EntityType};
use memcore_core::MemcoreResult;
use memcore_storage::queries::entity_ops;
use memcore_storage::tenant::Tx;

use crate::normalize::{is_prefix_containment, normalize_name};

/// Which stage produced a match, and whether it should be quarantined for
/// review rather than merged outright (stage 6 always quarantines).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Exact,
    Normalized,
    Fuzzy,
    Alias,
    CrossTypeExact,
    CrossTypeFuzzy,
}

#[derive(Debug, Clone)]
pub struct DedupMatch {
    pub entity: Entity,
    pub stage: MatchStage,
    pub quarantine: bool,
}

/// Try every stage in order against the live entities of `entity_type`
/// (and, for stages 5/6, every type). Returns `None` when nothing matches
/// and the caller should create a brand-new entity.
pub async fn find_duplicate(
    tx: &mut Tx<'_>,
    entity_type: EntityType,
    name: &str,
    config: &DedupConfig,
) -> MemcoreResult<Option<DedupMatch>> {
    if let Some(entity) = entity_ops::find_exact(tx, entity_type, name).await? {
        return Ok(Some(DedupMatch { entity, stage: MatchStage::Exact, quarantine: false }));
    }

    if let Some(entity) = find_normalized_match(tx, entity_type, name, config).await? {
        return Ok(Some(DedupMatch { entity, stage: MatchStage::Normalized, quarantine: false }));
    }

    let fuzzy = entity_ops::find_by_trigram(tx, entity_type, name, config.fuzzy_threshold as f32, 5).await?;
    if let Some((entity, _sim)) = fuzzy.into_iter().next() {
        return Ok(Some(DedupMatch { entity, stage: MatchStage::Fuzzy, quarantine: false }));
    }

    if let Some(entity) = find_alias_match(tx, entity_type, name).await? {
        return Ok(Some(DedupMatch { entity, stage: MatchStage::Alias, quarantine: false }));
    }

    if config.cross_type_dedup_enabled {
        let cross = entity_ops::find_cross_type(tx, name).await?;
        if let Some(entity) = cross.iter().find(|e| e.entity_type != entity_type).cloned() {
            return Ok(Some(DedupMatch { entity, stage: MatchStage::CrossTypeExact, quarantine: false }));
        }

        if let Some(entity) = find_cross_type_fuzzy(tx, entity_type, name, config).await? {
            return Ok(Some(DedupMatch { entity, stage: MatchStage::CrossTypeFuzzy, quarantine: true }));
        }
    }

    Ok(None)
}

async fn find_normalized_match(
    tx: &mut Tx<'_>,
    entity_type: EntityType,
    name: &str,
    config: &DedupConfig,
) -> MemcoreResult<Option<Entity>> {
    let normalized_candidate = normalize_name(name);
    let candidates = entity_ops::list_by_type(tx, entity_type, 500).await?;

    for candidate in candidates {
        let normalized_existing = normalize_name(&candidate.name);
        if normalized_existing == normalized_candidate {
            return Ok(Some(candidate));
        }
        if is_prefix_containment_with_ratio(&normalized_candidate, &normalized_existing, config.normalized_prefix_ratio) {
            return Ok(Some(candidate));
        }
    }

    Ok(None)
}

fn is_prefix_containment_with_ratio(a: &str, b: &str, ratio: f64) -> bool {
    if ratio == 0.6 {
        return is_prefix_containment(a, b);
    }
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.is_empty() || !longer.starts_with(shorter) {
        return false;
    }
    (shorter.len() as f64) >= ratio * (longer.len() as f64)
}

async fn find_alias_match(tx: &mut Tx<'_>, entity_type: EntityType, name: &str) -> MemcoreResult<Option<Entity>> {
    let candidates = entity_ops::list_by_type(tx, entity_type, 500).await?;
    let needle = name.to_lowercase();
    Ok(candidates
        .into_iter()
        .find(|c| c.aliases().iter().any(|a| a.to_lowercase() == needle)))
}

async fn find_cross_type_fuzzy(
    tx: &mut Tx<'_>,
    entity_type: EntityType,
    name: &str,
    config: &DedupConfig,
) -> MemcoreResult<Option<Entity>> {
    for other in EntityType::ALL.into_iter().filter(|t| *t != entity_type) {
        let fuzzy = entity_ops::find_by_trigram(tx, other, name, config.cross_type_fuzzy_threshold as f32, 1).await?;
        if let Some((entity, _sim)) = fuzzy.into_iter().next() {
            return Ok(Some(entity));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_ratio_matches_default_helper_at_default_config() {
        assert!(is_prefix_containment_with_ratio("sar", "sarah", 0.6));
        assert!(!is_prefix_containment_with_ratio("s", "sarah", 0.6));
    }

    #[test]
    fn looser_ratio_accepts_shorter_prefixes() {
        assert!(is_prefix_containment_with_ratio("s", "sarah", 0.1));
    }
}
