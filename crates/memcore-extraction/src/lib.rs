//! # memcore-extraction
//!
//! Entity extraction (§4.10): rule-based per-table extractors, a generic
//! recursive fallback, an LLM extractor, and the shared eight-step
//! post-processing pipeline (sanitize, tier soft-check, dedup-or-create,
//! owner-edge creation, inter-entity synthesis, profile sync) common to
//! every method.

pub mod candidate;
pub mod llm;
pub mod owner;
pub mod pipeline;
pub mod rules;

pub use candidate::{Candidate, CandidateEdge, EdgeSourceRef};
pub use owner::get_or_create_owner;
pub use pipeline::{extract_and_process, noop_notifier, ExtractionOutcome};
