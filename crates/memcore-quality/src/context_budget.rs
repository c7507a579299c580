//! Context-budget score (§4.4): ranks retrieved memories by a blend of
//! relevance, confidence, recency, and access frequency.

/// `relevance × confidence × recencyBoost × frequencyFactor` where
/// `recencyBoost = 1 + 0.5·exp(−days/30)` and
/// `frequencyFactor = log(accessCount+1)/log(maxAccessCount+1)`.
pub fn context_budget_score(
    relevance: f64,
    confidence: f64,
    days_since_access: f64,
    access_count: i64,
    max_access_count: i64,
) -> f64 {
    let recency_boost = 1.0 + 0.5 * (-days_since_access / 30.0).exp();
    let frequency_factor = if max_access_count <= 0 {
        0.0
    } else {
        let denom = ((max_access_count + 1) as f64).ln();
        if denom == 0.0 {
            0.0
        } else {
            ((access_count + 1) as f64).ln() / denom
        }
    };

    relevance * confidence * recency_boost * frequency_factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_frequently_accessed_memory_scores_higher_than_stale_rare_one() {
        let fresh = context_budget_score(1.0, 0.9, 1.0, 40, 50);
        let stale = context_budget_score(1.0, 0.9, 200.0, 1, 50);
        assert!(fresh > stale);
    }

    #[test]
    fn zero_max_access_count_yields_zero_frequency_factor() {
        let score = context_budget_score(1.0, 1.0, 0.0, 0, 0);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn recency_boost_decays_toward_one_over_time() {
        let near = context_budget_score(1.0, 1.0, 0.0, 10, 10);
        let far = context_budget_score(1.0, 1.0, 3000.0, 10, 10);
        assert!(near > far);
        assert!(far > 0.0);
    }
}
