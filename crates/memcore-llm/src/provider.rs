//! Provider traits (§6): one blocking extraction call, one embedding call.
//! Both are narrow on purpose — the extraction post-processing pipeline,
//! prompt assembly, and retry policy all live above this crate.

use crate::error::LlmResult;

/// A single extracted candidate entity as the LLM returns it, before any
/// dedup or ontology validation runs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExtractedEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub properties: serde_json::Value,
    #[serde(default)]
    pub edge: Option<ExtractedEdge>,
}

/// `source_ref`, when present, names a non-owner entity this edge
/// actually originates from (e.g. "Sarah likes sushi" → the edge's source
/// is Sarah, not the tenant's owner entity).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExtractedEdge {
    pub relation: String,
    #[serde(default)]
    pub source_ref: Option<String>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    0.5
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct ExtractionResponse {
    pub entities: Vec<ExtractedEntity>,
}

#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// One shot, schema-constrained extraction call. `json_schema` is a
    /// JSON-Schema document the provider should constrain its response to;
    /// implementations that can't enforce it client-side still parse and
    /// validate the response before returning.
    async fn extract(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_schema: &serde_json::Value,
    ) -> LlmResult<ExtractionResponse>;
}

#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> LlmResult<Vec<f32>>;

    /// The dimensionality this provider's embeddings carry, for collection
    /// bootstrap checks without making a network call.
    fn dimensions(&self) -> usize;
}
