//! The relation matrix (§4.3): for each canonical relation, which source
//! and target entity types it may connect. `None` means "any type".

use memcore_core::models::EntityType;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use EntityType::*;

#[derive(Debug, Clone, Copy)]
pub struct RelationDef {
    pub name: &'static str,
    pub source_types: Option<&'static [EntityType]>,
    pub target_types: Option<&'static [EntityType]>,
    /// Whether creating a new edge of this relation flips prior same-source
    /// edges of the same relation to `is_current = false` (§4.6 step 4).
    pub temporal: bool,
}

const PERSON_ONLY: &[EntityType] = &[Person];

static MATRIX: Lazy<HashMap<&'static str, RelationDef>> = Lazy::new(|| {
    let defs: &[RelationDef] = &[
        RelationDef { name: "works_at", source_types: Some(PERSON_ONLY), target_types: Some(&[Organization, Place]), temporal: true },
        RelationDef { name: "lives_in", source_types: Some(PERSON_ONLY), target_types: Some(&[Place]), temporal: true },
        RelationDef { name: "attends", source_types: Some(PERSON_ONLY), target_types: Some(&[Organization, Place, Event]), temporal: true },
        RelationDef { name: "married_to", source_types: Some(PERSON_ONLY), target_types: Some(PERSON_ONLY), temporal: false },
        RelationDef { name: "friend_of", source_types: Some(PERSON_ONLY), target_types: Some(PERSON_ONLY), temporal: false },
        RelationDef { name: "prefers", source_types: Some(PERSON_ONLY), target_types: None, temporal: false },
        RelationDef { name: "avoids", source_types: Some(PERSON_ONLY), target_types: None, temporal: false },
        RelationDef { name: "ate", source_types: Some(PERSON_ONLY), target_types: Some(&[Food]), temporal: false },
        RelationDef { name: "visited", source_types: Some(PERSON_ONLY), target_types: Some(&[Place, Organization]), temporal: false },
        RelationDef { name: "takes", source_types: Some(PERSON_ONLY), target_types: Some(&[Medication]), temporal: false },
        RelationDef { name: "attended_event", source_types: Some(PERSON_ONLY), target_types: Some(&[Event]), temporal: false },
        RelationDef { name: "participates_in", source_types: Some(PERSON_ONLY), target_types: Some(&[Activity]), temporal: false },
        RelationDef { name: "created", source_types: None, target_types: None, temporal: false },
        RelationDef { name: "category", source_types: None, target_types: Some(&[Topic]), temporal: false },
        RelationDef { name: "similar_to", source_types: None, target_types: None, temporal: false },
        RelationDef { name: "part_of", source_types: None, target_types: None, temporal: false },
        RelationDef { name: "related_to", source_types: None, target_types: None, temporal: false },
    ];
    defs.iter().map(|d| (d.name, *d)).collect()
});

pub fn is_known_relation(relation: &str) -> bool {
    MATRIX.contains_key(relation)
}

pub fn allowed_source_types(relation: &str) -> Option<&'static [EntityType]> {
    MATRIX.get(relation).and_then(|d| d.source_types)
}

pub fn allowed_target_types(relation: &str) -> Option<&'static [EntityType]> {
    MATRIX.get(relation).and_then(|d| d.target_types)
}

pub(crate) fn lookup(relation: &str) -> Option<RelationDef> {
    MATRIX.get(relation).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn works_at_is_temporal_person_to_org_or_place() {
        let def = lookup("works_at").unwrap();
        assert!(def.temporal);
        assert_eq!(def.source_types, Some(PERSON_ONLY));
        assert!(def.target_types.unwrap().contains(&Organization));
        assert!(def.target_types.unwrap().contains(&Place));
    }

    #[test]
    fn related_to_accepts_any_types() {
        let def = lookup("related_to").unwrap();
        assert!(def.source_types.is_none());
        assert!(def.target_types.is_none());
    }

    #[test]
    fn unknown_relation_is_unknown() {
        assert!(!is_known_relation("teleports_to"));
    }
}
