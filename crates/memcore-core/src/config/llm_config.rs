use serde::{Deserialize, Serialize};

/// External LLM/embedding provider settings (§6). The API key is read
/// from `OPENAI_API_KEY` at process start, never placed in a config file
/// that might get committed — see `memcore-daemon`'s config loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-5-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
            request_timeout_secs: 30,
        }
    }
}
