use serde::{Deserialize, Serialize};

/// Memory-Quality Engine tunables (§4.4, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub enable_decay: bool,
    pub decay_stale_days: i64,
    pub decay_confidence_delta: f64,
    pub decay_interval_ms: u64,
    pub access_promote_cap: i64,
    pub access_confidence_delta: f64,
    pub reaffirm_confidence_delta: f64,
    pub contradict_confidence_delta: f64,
    pub contradict_floor: f64,
    pub contradict_agreement_gap: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            enable_decay: false,
            decay_stale_days: 90,
            decay_confidence_delta: 0.10,
            decay_interval_ms: 86_400_000,
            access_promote_cap: 5,
            access_confidence_delta: 0.02,
            reaffirm_confidence_delta: 0.07,
            contradict_confidence_delta: 0.30,
            contradict_floor: 0.10,
            contradict_agreement_gap: 0.30,
        }
    }
}
