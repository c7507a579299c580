use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An end-user. Owns a private namespace in the store; the namespace name
/// is derived deterministically from `id` so `withTenant` never needs a
/// lookup round-trip to find it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: uuid::Uuid,
    pub namespace: String,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Namespace is `t_<uuid-no-dashes>` — a valid Postgres schema
    /// identifier, always starting with a letter.
    pub fn namespace_for(id: uuid::Uuid) -> String {
        format!("t_{}", id.simple())
    }
}
