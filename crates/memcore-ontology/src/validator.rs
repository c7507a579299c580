//! Strict vs self-evolving ontology validation (§4.3, §9 open question).
//! The build-time choice of default mode is recorded in
//! `memcore_core::config::OntologyConfig` and resolved in `DESIGN.md`.

pub use memcore_core::config::OntologyMode;
use memcore_core::models::EntityType;

use crate::relation_matrix::lookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub quarantine: bool,
}

/// Validate `relation` (already alias-normalized) against the matrix for
/// the given endpoint types, honoring the configured mode.
pub fn validate_relation(
    mode: OntologyMode,
    relation: &str,
    source_type: EntityType,
    target_type: EntityType,
) -> ValidationOutcome {
    let Some(def) = lookup(relation) else {
        return match mode {
            OntologyMode::Strict => ValidationOutcome { valid: false, quarantine: true },
            OntologyMode::SelfEvolving => ValidationOutcome { valid: true, quarantine: true },
        };
    };

    let source_ok = def.source_types.map(|types| types.contains(&source_type)).unwrap_or(true);
    let target_ok = def.target_types.map(|types| types.contains(&target_type)).unwrap_or(true);

    if source_ok && target_ok {
        ValidationOutcome { valid: true, quarantine: false }
    } else {
        match mode {
            OntologyMode::Strict => ValidationOutcome { valid: false, quarantine: true },
            OntologyMode::SelfEvolving => ValidationOutcome { valid: true, quarantine: true },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memcore_core::models::EntityType::*;

    #[test]
    fn known_relation_with_valid_endpoints_passes_clean() {
        let outcome = validate_relation(OntologyMode::Strict, "works_at", Person, Organization);
        assert_eq!(outcome, ValidationOutcome { valid: true, quarantine: false });
    }

    #[test]
    fn strict_mode_rejects_unknown_relation() {
        let outcome = validate_relation(OntologyMode::Strict, "teleports_to", Person, Place);
        assert_eq!(outcome, ValidationOutcome { valid: false, quarantine: true });
    }

    #[test]
    fn self_evolving_mode_accepts_unknown_relation_quarantined() {
        let outcome = validate_relation(OntologyMode::SelfEvolving, "teleports_to", Person, Place);
        assert_eq!(outcome, ValidationOutcome { valid: true, quarantine: true });
    }

    #[test]
    fn wrong_endpoint_types_quarantine_in_self_evolving() {
        let outcome = validate_relation(OntologyMode::SelfEvolving, "works_at", Food, Food);
        assert_eq!(outcome, ValidationOutcome { valid: true, quarantine: true });
    }

    #[test]
    fn wrong_endpoint_types_reject_in_strict() {
        let outcome = validate_relation(OntologyMode::Strict, "works_at", Food, Food);
        assert_eq!(outcome, ValidationOutcome { valid: false, quarantine: true });
    }
}
