use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One piece of supporting text for an edge (§3). Evidence accumulates
/// across reinforcement rather than being replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeEvidence {
    pub text: String,
    pub write_id: Option<uuid::Uuid>,
    pub recorded_at: DateTime<Utc>,
}

/// A directed, typed, weighted relationship between two entities (§3, §4.6).
/// `weight` saturates at 10 on reinforcement; `is_current` is only
/// meaningful for temporal relations such as `works_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: uuid::Uuid,
    pub source_id: uuid::Uuid,
    pub target_id: uuid::Uuid,
    pub relation: String,
    pub weight: f64,
    pub confidence: f64,
    pub evidence: Vec<EdgeEvidence>,
    pub properties: serde_json::Value,
    pub is_current: bool,
    pub meta_id: uuid::Uuid,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

pub const MAX_EDGE_WEIGHT: f64 = 10.0;

/// Relations that carry the "only one can be current" semantics (§3, §4.6
/// step 4). Not exhaustive of every possible temporal relation an agent
/// might invent — the ontology's relation matrix can flag more via
/// `RelationDef::temporal`.
pub const BUILTIN_TEMPORAL_RELATIONS: &[&str] = &["works_at", "lives_in", "attends"];
