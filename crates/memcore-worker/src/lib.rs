//! # memcore-worker
//!
//! The enrichment worker pool (§4.9): claims batches from
//! `enrichment_jobs` and `pending_vectors` under `FOR UPDATE SKIP LOCKED`,
//! runs extraction (or a parked embed) against the content each job
//! points at, and retries failures with exponential backoff.

pub mod job;
pub mod pool;

pub use job::{retry_pending_vector, run_enrichment_job};
pub use pool::WorkerPool;
