use serde::{Deserialize, Serialize};

/// Write-Ingestion Pipeline flags (§4.8, §6). `ledger_write_enabled` is
/// §9's "feature flag default is not determinable from source" question —
/// resolved to `true` here; see DESIGN.md.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub ledger_write_enabled: bool,
    pub vector_search_threshold: f64,
    pub vector_search_limit: i64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            ledger_write_enabled: true,
            vector_search_threshold: 0.7,
            vector_search_limit: 10,
        }
    }
}
