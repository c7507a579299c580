/// Storage-substrate-level errors, isolated from the domain error taxonomy
/// so a swapped-out adapter (§6 "storage substrate is opaque to the core")
/// only needs to produce this enum.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("tenant not found: {tenant_id}")]
    TenantNotFound { tenant_id: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("connection pool exhausted or closed")]
    PoolClosed,

    #[error("row-level lock contention on {table}:{key}")]
    LockContention { table: String, key: String },
}
