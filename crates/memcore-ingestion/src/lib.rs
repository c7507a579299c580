//! # memcore-ingestion
//!
//! The synchronous write-ingestion pipeline (§4.8): a consent check, a
//! fresh write id, a persist to the target store, a best-effort
//! knowledge-claim ledger entry, an audit event, and an enrichment-job
//! enqueue — with the vector-write degraded fallback chain when the
//! embedding provider or the queue tables themselves are unavailable.

pub mod degraded;
pub mod pipeline;
pub mod resource;

pub use degraded::{is_embedding_failure, is_missing_relation};
pub use pipeline::{ingest, IngestOutcome};
pub use resource::{IngestRequest, WriteRequest, WriteStatus};
