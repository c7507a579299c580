use serde::{Deserialize, Serialize};

/// Enrichment Worker Pool scheduling (§4.9, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub enabled: bool,
    pub batch_size: i64,
    pub poll_ms: u64,
    pub max_attempts: i32,
    pub backoff_min_secs: u64,
    pub backoff_max_secs: u64,
    pub backoff_base_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            batch_size: 25,
            poll_ms: 5_000,
            max_attempts: 10,
            backoff_min_secs: 5,
            backoff_max_secs: 600,
            backoff_base_secs: 5,
        }
    }
}

impl WorkerConfig {
    /// `min(600, max(5, 2^n * 5))` seconds (§4.9).
    pub fn backoff_for_attempt(&self, attempt: i32) -> u64 {
        let exp = 2u64.saturating_pow(attempt.max(0) as u32).saturating_mul(self.backoff_base_secs);
        exp.clamp(self.backoff_min_secs, self.backoff_max_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_then_caps_at_max() {
        let config = WorkerConfig::default();
        assert_eq!(config.backoff_for_attempt(0), 5);
        assert_eq!(config.backoff_for_attempt(1), 10);
        assert_eq!(config.backoff_for_attempt(2), 20);
        assert_eq!(config.backoff_for_attempt(10), 600);
    }

    #[test]
    fn backoff_never_drops_below_min_on_negative_attempt() {
        let config = WorkerConfig::default();
        assert_eq!(config.backoff_for_attempt(-3), 5);
    }

    #[test]
    fn backoff_does_not_overflow_on_huge_attempt_counts() {
        let config = WorkerConfig::default();
        assert_eq!(config.backoff_for_attempt(i32::MAX), 600);
    }
}
