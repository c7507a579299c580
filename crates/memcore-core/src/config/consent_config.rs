use serde::{Deserialize, Serialize};

/// Consent & Audit Gate settings (§4.11). Mostly structural — the
/// interesting knobs live in the domain vocabulary, not here — but kept
/// as its own config struct for symmetry with every other component and
/// because a deployment-specific audit retention window belongs here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsentConfig {
    pub audit_retention_days: i64,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            audit_retention_days: 365,
        }
    }
}
