//! LLM/embedding provider errors (§6). The ingestion pipeline downgrades
//! to `pending_enrichment` by pattern-matching on the message, so the two
//! failure modes it cares about are distinguished by substring rather than
//! a variant — callers that don't care just propagate the whole thing.

/// `message` must contain the literal substring `"embedding"` for an
/// embedding-provider failure, or `"api key"` for an auth failure, so
/// `memcore-ingestion` can tell them apart without a dependency on this
/// crate's concrete error type.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("embedding provider request failed: {0}")]
    Embedding(String),

    #[error("llm provider request failed: invalid api key: {0}")]
    ApiKey(String),

    #[error("llm provider request failed: {0}")]
    Request(String),

    #[error("llm provider returned a response that did not match the requested schema: {0}")]
    SchemaMismatch(String),

    #[error("llm provider request timed out after {0}s")]
    Timeout(u64),
}

impl LlmError {
    pub fn is_embedding_failure(&self) -> bool {
        matches!(self, LlmError::Embedding(_))
    }

    pub fn is_api_key_failure(&self) -> bool {
        matches!(self, LlmError::ApiKey(_))
    }
}

pub type LlmResult<T> = Result<T, LlmError>;
