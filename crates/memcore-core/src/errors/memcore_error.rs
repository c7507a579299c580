use super::{SandboxError, StorageError};

/// Top-level error type for the memory-store core. Every subsystem error
/// converts into this via `From`. Variants map 1:1 onto the §7 error kinds
/// so an HTTP edge (out of scope here) can render a status without
/// re-deriving the taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum MemcoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("consent denied: agent {agent_id} lacks {permission} on {resource}")]
    ConsentDenied {
        agent_id: String,
        resource: String,
        permission: String,
    },

    #[error("tier limit exceeded: {resource} at {current}/{limit}")]
    TierLimit {
        resource: String,
        current: i64,
        limit: i64,
    },

    #[error("not found: {kind} {id}")]
    NotFound { kind: String, id: String },

    #[error("sql sandbox error: {0}")]
    SqlSandbox(#[from] SandboxError),

    #[error("identity violation: cannot set {field} to {value}")]
    IdentityViolation { field: String, value: String },

    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("transient error, safe to retry: {0}")]
    Transient(String),

    #[error("fatal error: {0}")]
    Fatal(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MemcoreError {
    /// Whether an enrichment-worker caller should retry this error with
    /// backoff (§4.9, §7 propagation policy) rather than mark the job
    /// permanently failed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MemcoreError::Transient(_) | MemcoreError::Storage(StorageError::LockContention { .. }))
    }
}

pub type MemcoreResult<T> = Result<T, MemcoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_and_lock_contention_are_retryable() {
        assert!(MemcoreError::Transient("timeout".into()).is_retryable());
        assert!(MemcoreError::Storage(StorageError::LockContention {
            table: "entities".into(),
            key: "123".into(),
        })
        .is_retryable());
    }

    #[test]
    fn validation_and_not_found_are_not_retryable() {
        assert!(!MemcoreError::Validation("bad field".into()).is_retryable());
        assert!(!MemcoreError::NotFound { kind: "entity".into(), id: "1".into() }.is_retryable());
        assert!(!MemcoreError::Fatal("panic upstream".into()).is_retryable());
    }

    #[test]
    fn display_text_carries_recognizable_substrings_for_degraded_mode_detection() {
        let missing_relation = MemcoreError::Storage(StorageError::Database(
            "relation \"enrichment_jobs\" does not exist".into(),
        ));
        assert!(missing_relation.to_string().contains("does not exist"));
    }
}
