use serde::{Deserialize, Serialize};

/// §9 Open Question: strict vs. self-evolving is a build-time choice, not
/// determinable from the (unavailable) original source. Resolved here as a
/// config field defaulting to `SelfEvolving` — see DESIGN.md for the
/// rationale — with `Strict` fully supported for deployments that want it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OntologyMode {
    Strict,
    SelfEvolving,
}

impl Default for OntologyMode {
    fn default() -> Self {
        OntologyMode::SelfEvolving
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OntologyConfig {
    pub mode: OntologyMode,
    pub cross_type_dedup_enabled: bool,
}

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            mode: OntologyMode::default(),
            cross_type_dedup_enabled: false,
        }
    }
}
