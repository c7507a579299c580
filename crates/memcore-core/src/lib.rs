//! # memcore-core
//!
//! Shared types, error taxonomy and configuration for the memory-store
//! write-ingestion and knowledge-synthesis core. No I/O lives here; every
//! other crate in the workspace depends on this one.

pub mod config;
pub mod errors;
pub mod models;

pub use errors::{MemcoreError, MemcoreResult};
