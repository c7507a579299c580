use serde::{Deserialize, Serialize};

/// Deduplication Engine thresholds (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub fuzzy_threshold: f64,
    pub cross_type_fuzzy_threshold: f64,
    pub normalized_prefix_ratio: f64,
    pub cross_type_dedup_enabled: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.6,
            cross_type_fuzzy_threshold: 0.7,
            normalized_prefix_ratio: 0.6,
            cross_type_dedup_enabled: false,
        }
    }
}
