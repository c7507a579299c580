use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::memory_meta::MemoryOrigin;

/// The subject of a knowledge claim: either the owner (the write itself)
/// or a specific entity a non-owner edge originates from (§4.10 `edge.sourceRef`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    Owner,
    Entity { entity_id: uuid::Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Created,
    Contradicted,
    Superseded,
    Reaffirmed,
}

/// Append-only ledger entry linking a write to the fact(s) it asserted (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeClaim {
    pub id: uuid::Uuid,
    pub claim_type: String,
    pub subject: Subject,
    pub predicate: String,
    pub object: serde_json::Value,
    pub confidence: f64,
    pub status: ClaimStatus,
    pub method: String,
    pub origin: MemoryOrigin,
    pub source_ref: serde_json::Value,
    pub write_id: uuid::Uuid,
    pub agent_id: String,
    pub evidence: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A side-table event recording a ledger-status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimEvent {
    pub id: uuid::Uuid,
    pub claim_id: uuid::Uuid,
    pub event: ClaimStatus,
    pub at: DateTime<Utc>,
    pub detail: serde_json::Value,
}
