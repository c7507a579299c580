use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One embedded memory (§3, §4.7). `embedding` is stored as `pgvector` in
/// Postgres; kept as a plain `Vec<f32>` here so pure-logic crates (dedup,
/// quality) never need a `pgvector` dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRow {
    pub id: uuid::Uuid,
    pub collection: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
    pub meta_id: uuid::Uuid,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A collection's declared embedding dimensionality, fixed at
/// first-write (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorCollection {
    pub name: String,
    pub dimensions: i32,
    pub created_at: DateTime<Utc>,
}
