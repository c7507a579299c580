use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-tier resource caps (§4.12, §6). `-1` means unlimited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierLimits {
    pub tables: i64,
    pub agents: i64,
    pub graph_entities: i64,
    pub audit_retention_days: i64,
}

impl TierLimits {
    pub const FREE: TierLimits = TierLimits {
        tables: 2,
        agents: 3,
        graph_entities: 100,
        audit_retention_days: 30,
    };
    pub const PRO: TierLimits = TierLimits {
        tables: -1,
        agents: -1,
        graph_entities: -1,
        audit_retention_days: 365,
    };
    pub const ENTERPRISE: TierLimits = TierLimits {
        tables: -1,
        agents: -1,
        graph_entities: -1,
        audit_retention_days: -1,
    };

    pub fn at_cap(limit: i64, current: i64) -> bool {
        limit >= 0 && current >= limit
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeteringConfig {
    pub tier_limits: HashMap<String, TierLimits>,
    pub usage_flush_interval_secs: u64,
}

impl Default for MeteringConfig {
    fn default() -> Self {
        let mut tier_limits = HashMap::new();
        tier_limits.insert("free".to_string(), TierLimits::FREE);
        tier_limits.insert("pro".to_string(), TierLimits::PRO);
        tier_limits.insert("enterprise".to_string(), TierLimits::ENTERPRISE);
        Self {
            tier_limits,
            usage_flush_interval_secs: 10,
        }
    }
}

impl MeteringConfig {
    pub fn limits_for(&self, tier: &str) -> TierLimits {
        self.tier_limits
            .get(tier)
            .copied()
            .unwrap_or(TierLimits::FREE)
    }
}
