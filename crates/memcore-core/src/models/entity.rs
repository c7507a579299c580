use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_type::EntityType;

/// A node in the knowledge graph (§3). `properties` always carries an
/// `aliases: Vec<String>` array once the dedup engine has merged anything
/// into this entity; absent for a freshly-created entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: uuid::Uuid,
    pub entity_type: EntityType,
    pub name: String,
    pub properties: serde_json::Value,
    pub confidence: f64,
    pub mention_count: i64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity {
    pub fn is_owner(&self) -> bool {
        self.properties
            .get("is_owner")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn aliases(&self) -> Vec<String> {
        self.properties
            .get("aliases")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
