use serde::{Deserialize, Serialize};

/// Entity Extraction method selection (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    RuleBased,
    Llm,
    LlmFirst,
    Batch,
}

impl Default for ExtractionMethod {
    fn default() -> Self {
        ExtractionMethod::LlmFirst
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub method: ExtractionMethod,
    pub nightly_batch_size: i64,
    pub profile_digest_max_chars: usize,
    pub top_entities_for_prompt: usize,
    pub min_name_len: usize,
    pub denylist: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            method: ExtractionMethod::default(),
            nightly_batch_size: 100,
            profile_digest_max_chars: 2_000,
            top_entities_for_prompt: 50,
            min_name_len: 2,
            denylist: vec![
                "unknown".into(),
                "user".into(),
                "record".into(),
                "none".into(),
                "n/a".into(),
                "item".into(),
            ],
        }
    }
}

impl ExtractionConfig {
    /// §6: `NIGHTLY_EXTRACTION_BATCH_SIZE` clamped 1..1000.
    pub fn clamped_batch_size(&self) -> i64 {
        self.nightly_batch_size.clamp(1, 1000)
    }
}
