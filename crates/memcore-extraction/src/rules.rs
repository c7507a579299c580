//! Rule-based extraction (§4.10): per-table extractors for the known
//! tables, a generic recursive fallback for everything else, and the
//! sanitize pass that filters low-signal names regardless of method.

use memcore_core::config::ExtractionConfig;
use memcore_core::models::EntityType;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::candidate::{Candidate, EdgeSourceRef};

static DATE_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$|^\d{1,2}/\d{1,2}(/\d{2,4})?$").unwrap());

/// Goal-pair heuristic: a path segment starting `current_` paired with a
/// sibling `goal_` (or vice versa) describes a tracked numeric preference
/// (§4.10).
fn goal_pair_partner(key: &str) -> Option<String> {
    if let Some(rest) = key.strip_prefix("current_") {
        Some(format!("goal_{rest}"))
    } else if let Some(rest) = key.strip_prefix("goal_") {
        Some(format!("current_{rest}"))
    } else {
        None
    }
}

/// Infer an entity type from a path token (§4.10: "family"→person,
/// "gym"→place, "meal"→food, …). Falls back to `Topic` for anything
/// unrecognized rather than `Custom`, since rule-based candidates are
/// meant to land inside the closed taxonomy.
fn infer_type_from_token(token: &str) -> EntityType {
    let t = token.to_lowercase();
    match t.as_str() {
        "family" | "friend" | "friends" | "contact" | "contacts" | "person" | "people" => EntityType::Person,
        "employer" | "company" | "organization" | "school" | "university" => EntityType::Organization,
        "gym" | "home" | "place" | "location" | "city" | "address" => EntityType::Place,
        "meal" | "meals" | "food" | "diet" | "ingredient" | "recipe" => EntityType::Food,
        "hobby" | "hobbies" | "topic" | "interest" | "interests" => EntityType::Topic,
        "preference" | "preferences" | "goal" | "goals" => EntityType::Preference,
        "event" | "appointment" | "trip" => EntityType::Event,
        "workout" | "workouts" | "exercise" | "activity" | "sport" => EntityType::Activity,
        "medication" | "medications" | "drug" | "prescription" => EntityType::Medication,
        "show" | "movie" | "book" | "media" | "podcast" => EntityType::Media,
        _ => EntityType::Topic,
    }
}

/// Infer a relation from a path token. Small heuristic table (§4.10); not
/// exhaustive, but a safe fallback edge is always attached by the caller
/// when this yields nothing relation-specific.
fn infer_relation_from_token(token: &str) -> Option<&'static str> {
    let t = token.to_lowercase();
    match t.as_str() {
        "employer" | "company" => Some("works_at"),
        "school" | "university" => Some("attends"),
        "home" | "address" | "city" => Some("lives_in"),
        "meal" | "meals" | "food" | "diet" => Some("ate"),
        "gym" | "place" | "location" => Some("visited"),
        "medication" | "medications" | "drug" | "prescription" => Some("takes"),
        "workout" | "workouts" | "exercise" | "activity" | "sport" => Some("participates_in"),
        "hobby" | "hobbies" | "interest" | "interests" => Some("prefers"),
        "event" | "appointment" | "trip" => Some("attended_event"),
        "family" | "friend" | "friends" | "contact" | "contacts" => Some("friend_of"),
        _ => None,
    }
}

/// §4.10 sanitize pass applied regardless of which method produced a
/// candidate: drop short names, date-looking tokens, and denylisted
/// system words.
pub fn is_low_signal(name: &str, config: &ExtractionConfig) -> bool {
    let trimmed = name.trim();
    if trimmed.chars().count() <= config.min_name_len {
        return true;
    }
    if DATE_LIKE.is_match(trimmed) {
        return true;
    }
    let lower = trimmed.to_lowercase();
    config.denylist.iter().any(|d| d == &lower)
}

pub fn sanitize(candidates: Vec<Candidate>, config: &ExtractionConfig) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| !is_low_signal(&c.name, config))
        .collect()
}

pub fn dedupe_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert((c.entity_type, c.name.to_lowercase())))
        .collect()
}

/// Extractor for the `meals` table: the food itself, plus an `ate` edge
/// from the owner.
pub fn extract_meal(row: &serde_json::Value) -> Vec<Candidate> {
    let mut out = Vec::new();
    if let Some(name) = row.get("food").and_then(|v| v.as_str()).or_else(|| row.get("name").and_then(|v| v.as_str())) {
        out.push(
            Candidate::new(EntityType::Food, name, 0.6)
                .with_edge("ate", EdgeSourceRef::Owner)
                .with_evidence(format!("logged a meal: {name}")),
        );
    }
    out
}

/// Extractor for the `workouts` table.
pub fn extract_workout(row: &serde_json::Value) -> Vec<Candidate> {
    let mut out = Vec::new();
    if let Some(name) = row.get("activity").and_then(|v| v.as_str()).or_else(|| row.get("name").and_then(|v| v.as_str())) {
        out.push(
            Candidate::new(EntityType::Activity, name, 0.6)
                .with_edge("participates_in", EdgeSourceRef::Owner)
                .with_evidence(format!("logged a workout: {name}")),
        );
    }
    out
}

/// Extractor for the `medications` table.
pub fn extract_medication(row: &serde_json::Value) -> Vec<Candidate> {
    let mut out = Vec::new();
    if let Some(name) = row.get("name").and_then(|v| v.as_str()) {
        out.push(
            Candidate::new(EntityType::Medication, name, 0.7)
                .with_edge("takes", EdgeSourceRef::Owner)
                .with_evidence(format!("logged a medication: {name}")),
        );
    }
    out
}

/// Extractor for `profile` merge patches: family members, employer, and
/// goal-pair tracked preferences.
pub fn extract_profile(patch: &serde_json::Value) -> Vec<Candidate> {
    let mut out = Vec::new();

    if let Some(family) = patch.get("family").and_then(|v| v.as_array()) {
        for member in family {
            if let Some(name) = member.get("name").and_then(|v| v.as_str()) {
                out.push(
                    Candidate::new(EntityType::Person, name, 0.7)
                        .with_edge("friend_of", EdgeSourceRef::Owner)
                        .with_evidence("listed in profile.family"),
                );
            }
        }
    }
    if let Some(company) = patch.get("work").and_then(|v| v.get("company")).and_then(|v| v.as_str()) {
        out.push(
            Candidate::new(EntityType::Organization, company, 0.7)
                .with_edge("works_at", EdgeSourceRef::Owner)
                .with_evidence("set in profile.work.company"),
        );
    }

    out.extend(extract_generic(patch, &[]));
    out
}

/// Generic recursive fallback (§4.10): walks the payload tree, infers
/// type/relation from path tokens, and applies the goal-pair heuristic for
/// `current_X`/`goal_X` numeric sibling pairs.
pub fn extract_generic(value: &serde_json::Value, path: &[String]) -> Vec<Candidate> {
    let mut out = Vec::new();

    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let mut child_path = path.to_vec();
                child_path.push(key.clone());

                if let Some(partner) = goal_pair_partner(key) {
                    if map.contains_key(&partner) {
                        if let (Some(current), Some(goal)) = (value.get(key), value.get(&partner)) {
                            if current.is_number() && goal.is_number() {
                                let label = key.strip_prefix("current_").or_else(|| key.strip_prefix("goal_")).unwrap_or(key);
                                out.push(
                                    Candidate::new(EntityType::Preference, format!("{label} goal"), 0.5)
                                        .with_edge("prefers", EdgeSourceRef::Owner)
                                        .with_properties(serde_json::json!({ "current": current, "goal": goal }))
                                        .with_evidence(format!("tracked preference: {label}")),
                                );
                            }
                        }
                    }
                }

                match child {
                    serde_json::Value::String(s) => {
                        let token = child_path.last().cloned().unwrap_or_default();
                        let entity_type = infer_type_from_token(&token);
                        let relation = infer_relation_from_token(&token);
                        let mut candidate = Candidate::new(entity_type, s.clone(), 0.45);
                        if let Some(rel) = relation {
                            candidate = candidate.with_edge(rel, EdgeSourceRef::Owner);
                        }
                        out.push(candidate.with_evidence(format!("{}: {}", child_path.join("."), s)));
                    }
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        out.extend(extract_generic(child, &child_path));
                    }
                    _ => {}
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                out.extend(extract_generic(item, path));
            }
        }
        _ => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_extractor_produces_a_food_candidate_with_owner_edge() {
        let row = serde_json::json!({ "food": "salmon" });
        let candidates = extract_meal(&row);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].entity_type, EntityType::Food);
        assert_eq!(candidates[0].edge.as_ref().unwrap().relation, "ate");
    }

    #[test]
    fn sanitize_drops_short_and_denylisted_names() {
        let config = ExtractionConfig::default();
        let candidates = vec![
            Candidate::new(EntityType::Topic, "ok", 0.5),
            Candidate::new(EntityType::Topic, "unknown", 0.5),
            Candidate::new(EntityType::Topic, "Sarah", 0.5),
        ];
        let sanitized = sanitize(candidates, &config);
        assert_eq!(sanitized.len(), 1);
        assert_eq!(sanitized[0].name, "Sarah");
    }

    #[test]
    fn date_like_tokens_are_filtered() {
        let config = ExtractionConfig::default();
        assert!(is_low_signal("2024-01-01", &config));
        assert!(!is_low_signal("Sarah", &config));
    }

    #[test]
    fn goal_pair_partner_flips_prefix() {
        assert_eq!(goal_pair_partner("current_weight"), Some("goal_weight".to_string()));
        assert_eq!(goal_pair_partner("goal_weight"), Some("current_weight".to_string()));
        assert_eq!(goal_pair_partner("weight"), None);
    }

    #[test]
    fn generic_extraction_walks_nested_objects() {
        let payload = serde_json::json!({ "family": [{ "name": "Marcus" }] });
        let candidates = extract_generic(&payload, &[]);
        assert!(candidates.iter().any(|c| c.name == "Marcus" && c.entity_type == EntityType::Person));
    }

    #[test]
    fn goal_pair_extracted_as_tracked_preference() {
        let payload = serde_json::json!({ "current_weight": 180, "goal_weight": 165 });
        let candidates = extract_generic(&payload, &[]);
        assert!(candidates.iter().any(|c| c.entity_type == EntityType::Preference));
    }
}
