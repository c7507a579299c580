use serde::{Deserialize, Serialize};

/// Connection-pool and tenant-provisioning settings for the Postgres
/// substrate (§4.1, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/memcore".to_string(),
            max_connections: 20,
            min_connections: 2,
            acquire_timeout_secs: 10,
        }
    }
}
