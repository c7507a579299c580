use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which store a memory-meta row provides provenance for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Profile,
    Table,
    Vector,
    Entity,
    Edge,
}

/// A stable pointer into the store a meta row describes. Deliberately not
/// a single opaque string: each variant carries exactly the fields needed
/// to re-fetch the underlying row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRef {
    Profile { version: i64, path: String },
    Table { table: String, row_id: uuid::Uuid },
    Vector { collection: String, row_id: uuid::Uuid },
    Entity { entity_id: uuid::Uuid },
    Edge { edge_id: uuid::Uuid },
}

/// Where a fact came from. Doubles as the source-precedence key in
/// profile-sync conflicts (§4.3) — see `SourceType::precedence` on
/// `memcore_ontology::precedence` for the total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryOrigin {
    UserTyped,
    UserStated,
    Imported,
    System,
    AiStated,
    AiInferred,
    AiPattern,
    Contradicted,
}

impl MemoryOrigin {
    /// Initial confidence on `create` (§4.4 table).
    pub fn initial_confidence(&self) -> f64 {
        match self {
            MemoryOrigin::UserTyped => 0.95,
            MemoryOrigin::UserStated => 0.90,
            MemoryOrigin::Imported => 0.70,
            MemoryOrigin::System => 0.50,
            MemoryOrigin::AiStated => 0.40,
            MemoryOrigin::AiInferred => 0.35,
            MemoryOrigin::AiPattern => 0.30,
            MemoryOrigin::Contradicted => 0.10,
        }
    }
}

/// Status lifecycle (§4.4). `Review` and `Rejected` are sticky terminal
/// states reachable only via `user resolve` or a contradiction event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStatus {
    Unvetted,
    Active,
    Trusted,
    Decayed,
    Review,
    Rejected,
}

impl MemoryStatus {
    /// Status as a pure function of confidence, used whenever a transition
    /// isn't one of the sticky states. `review`/`rejected` are never
    /// produced here — only by the explicit contradiction/resolve events.
    pub fn from_confidence(confidence: f64) -> MemoryStatus {
        if confidence >= 0.8 {
            MemoryStatus::Trusted
        } else if confidence >= 0.5 {
            MemoryStatus::Active
        } else if confidence < 0.3 {
            MemoryStatus::Decayed
        } else {
            MemoryStatus::Unvetted
        }
    }

    pub fn is_sticky(&self) -> bool {
        matches!(self, MemoryStatus::Review | MemoryStatus::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_confidence_matches_the_origin_table() {
        assert_eq!(MemoryOrigin::UserTyped.initial_confidence(), 0.95);
        assert_eq!(MemoryOrigin::UserStated.initial_confidence(), 0.90);
        assert_eq!(MemoryOrigin::Contradicted.initial_confidence(), 0.10);
    }

    #[test]
    fn status_from_confidence_boundaries() {
        assert_eq!(MemoryStatus::from_confidence(0.8), MemoryStatus::Trusted);
        assert_eq!(MemoryStatus::from_confidence(0.79), MemoryStatus::Active);
        assert_eq!(MemoryStatus::from_confidence(0.5), MemoryStatus::Active);
        assert_eq!(MemoryStatus::from_confidence(0.49), MemoryStatus::Unvetted);
        assert_eq!(MemoryStatus::from_confidence(0.3), MemoryStatus::Unvetted);
        assert_eq!(MemoryStatus::from_confidence(0.29), MemoryStatus::Decayed);
    }

    #[test]
    fn review_and_rejected_are_the_only_sticky_statuses() {
        assert!(MemoryStatus::Review.is_sticky());
        assert!(MemoryStatus::Rejected.is_sticky());
        assert!(!MemoryStatus::Trusted.is_sticky());
        assert!(!MemoryStatus::Decayed.is_sticky());
    }
}

/// One entry in a meta row's append-only `promote_history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteEvent {
    pub from_status: MemoryStatus,
    pub to_status: MemoryStatus,
    pub from_confidence: f64,
    pub to_confidence: f64,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Provenance + quality record attached to every user-visible fact (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryMeta {
    pub id: uuid::Uuid,
    pub source_type: SourceType,
    pub source_ref: SourceRef,
    pub origin: MemoryOrigin,
    pub confidence: f64,
    pub status: MemoryStatus,
    pub access_count: i64,
    pub last_accessed: DateTime<Utc>,
    pub last_reinforced: DateTime<Utc>,
    pub contradictions: Vec<uuid::Uuid>,
    pub promote_history: Vec<PromoteEvent>,
    pub created_at: DateTime<Utc>,
}
