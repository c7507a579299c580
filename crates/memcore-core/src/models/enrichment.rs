use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Retry,
    Done,
    Failed,
}

/// What an enrichment job operates on — mirrors `SourceType` but widened
/// with the `pending_vector` special case (§4.8 step 7).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobTarget {
    Profile { version: i64 },
    Table { table: String, row_id: uuid::Uuid },
    Vector { collection: String, row_id: uuid::Uuid },
    PendingVector { pending_id: uuid::Uuid },
}

/// A queued unit of enrichment work (§3, §4.9). `next_run_at` gates when a
/// `retry`-status row becomes eligible for another claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentJob {
    pub id: uuid::Uuid,
    pub write_id: uuid::Uuid,
    pub target: JobTarget,
    pub payload: serde_json::Value,
    pub status: JobStatus,
    pub attempt_count: i32,
    pub next_run_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A vector write that couldn't be embedded synchronously (§4.8 step 7).
/// Promoted to a real `VectorRow` once the embedding provider recovers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingVector {
    pub id: uuid::Uuid,
    pub collection: String,
    pub text: String,
    pub metadata: serde_json::Value,
    pub meta_id: uuid::Uuid,
    pub status: JobStatus,
    pub attempt_count: i32,
    pub next_run_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}
