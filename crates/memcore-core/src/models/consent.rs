use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    None,
    Read,
    Write,
}

/// A consent grant for one agent over one resource pattern (§3, §4.11).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRule {
    pub id: uuid::Uuid,
    pub agent_id: String,
    pub resource_pattern: String,
    pub permission: Permission,
    pub granted_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ConsentRule {
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}
