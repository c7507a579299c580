//! Degraded-mode detection (§4.8 steps 6-7): tell a genuinely-missing
//! queue table apart from an ordinary failure, and an embedding-provider
//! failure from every other vector-write error, by inspecting the bubbled
//! error message rather than adding a cross-crate error dependency.

use memcore_core::MemcoreError;

pub fn is_missing_relation(err: &MemcoreError) -> bool {
    err.to_string().contains("does not exist")
}

/// `memcore-llm`'s `LlmError::Embedding`/`ApiKey` Display text is required
/// to carry these substrings (§6); `insert_vector_text` wraps embedding
/// failures in `MemcoreError::Transient`, preserving the message.
pub fn is_embedding_failure(err: &MemcoreError) -> bool {
    let msg = err.to_string();
    msg.contains("embedding") || msg.contains("api key")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_missing_relation_from_postgres_wording() {
        let err = MemcoreError::Storage(memcore_core::errors::StorageError::Database(
            "relation \"enrichment_jobs\" does not exist".to_string(),
        ));
        assert!(is_missing_relation(&err));
    }

    #[test]
    fn detects_embedding_failure_by_substring() {
        let err = MemcoreError::Transient("embedding provider request failed: timeout".to_string());
        assert!(is_embedding_failure(&err));
    }

    #[test]
    fn detects_api_key_failure_by_substring() {
        let err = MemcoreError::Transient("llm provider request failed: invalid api key: bad token".to_string());
        assert!(is_embedding_failure(&err));
    }

    #[test]
    fn unrelated_error_is_neither() {
        let err = MemcoreError::Validation("bad input".to_string());
        assert!(!is_missing_relation(&err));
        assert!(!is_embedding_failure(&err));
    }
}
