use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row in a dynamically-shaped user table (§3, §4.7). `fields` holds the
/// user columns; the five standard columns are pulled out as real struct
/// fields since every caller needs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    pub id: uuid::Uuid,
    pub table_name: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub meta_id: Option<uuid::Uuid>,
}

/// Tables the ingestion pipeline and agents may never write to directly
/// (§4.7). Membership is checked before INSERT/UPDATE/DELETE, not before
/// SELECT — the sandbox (§4.2) handles read isolation separately.
pub const WRITE_PROTECTED_TABLES: &[&str] = &["audit_log", "_table_registry", "_memory_meta"];

pub fn is_write_protected(table: &str) -> bool {
    WRITE_PROTECTED_TABLES.contains(&table)
}
