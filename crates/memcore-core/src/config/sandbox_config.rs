use serde::{Deserialize, Serialize};

/// SQL sandbox bounds (§4.2). All are clamped at the edge, not merely
/// validated, so a caller asking for `timeout_secs: 9999` gets 60 rather
/// than a rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub max_query_len: usize,
    pub min_timeout_secs: u32,
    pub max_timeout_secs: u32,
    pub min_row_limit: u32,
    pub max_row_limit: u32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            max_query_len: 10_000,
            min_timeout_secs: 1,
            max_timeout_secs: 60,
            min_row_limit: 1,
            max_row_limit: 10_000,
        }
    }
}
