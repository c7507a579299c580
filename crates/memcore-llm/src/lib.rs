//! # memcore-llm
//!
//! Provider traits for entity extraction and embeddings (§6), plus a
//! `reqwest`-based implementation against OpenAI-compatible endpoints.
//! Failure messages are written so `memcore-ingestion` can downgrade to
//! `pending_enrichment` by checking for the `embedding`/`api key`
//! substrings without depending on this crate's error type.

mod error;
mod openai;
mod provider;

pub use error::{LlmError, LlmResult};
pub use openai::OpenAiProvider;
pub use provider::{EmbeddingProvider, ExtractedEdge, ExtractedEntity, ExtractionResponse, LlmProvider};
