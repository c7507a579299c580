use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline stages audited per write-id (§4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ProfileWritten,
    TableWritten,
    VectorWritten,
    VectorPending,
    EnrichmentQueued,
    EnrichmentDone,
    EnrichmentFailed,
}

/// One append-only audit row (§3, §4.11). `success` lets a failed
/// best-effort stage (claim-ledger write, enqueue) still be recorded
/// without being mistaken for a successful one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: uuid::Uuid,
    pub write_id: uuid::Uuid,
    pub stage: PipelineStage,
    pub source_ref: Option<serde_json::Value>,
    pub latency_ms: Option<i64>,
    pub success: bool,
    pub detail: serde_json::Value,
    pub at: DateTime<Utc>,
}
