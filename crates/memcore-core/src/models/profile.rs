use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row in the append-only profile version history (§3, §4.7). The
/// latest row per tenant (`MAX(version)`) is the authoritative profile;
/// updates never mutate in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileVersion {
    pub version: i64,
    pub document: serde_json::Value,
    pub changed_fields: Vec<String>,
    pub changed_by: String,
    pub meta_id: uuid::Uuid,
    pub created_at: DateTime<Utc>,
}
