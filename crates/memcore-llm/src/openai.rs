//! A concrete `reqwest`-based provider against OpenAI-compatible chat and
//! embedding endpoints (§6 configuration: `OPENAI_MODEL`,
//! `OPENAI_EMBEDDING_MODEL`, `OPENAI_API_KEY`).

use std::time::Duration;

use serde_json::json;

use crate::error::{LlmError, LlmResult};
use crate::provider::{EmbeddingProvider, ExtractionResponse, LlmProvider};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    embedding_model: String,
    embedding_dimensions: usize,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, embedding_model: String, embedding_dimensions: usize, request_timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self { client, api_key, model, embedding_model, embedding_dimensions }
    }

    fn classify_error(&self, status: reqwest::StatusCode, body: &str, embedding: bool) -> LlmError {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return LlmError::ApiKey(format!("openai rejected the api key ({status}): {body}"));
        }
        if embedding {
            LlmError::Embedding(format!("openai embedding request failed ({status}): {body}"))
        } else {
            LlmError::Request(format!("openai chat request failed ({status}): {body}"))
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn extract(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_schema: &serde_json::Value,
    ) -> LlmResult<ExtractionResponse> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {"name": "extraction", "schema": json_schema, "strict": true},
            },
        });

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| LlmError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(self.classify_error(status, &text, false));
        }

        let envelope: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| LlmError::SchemaMismatch(e.to_string()))?;

        let content = envelope
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| LlmError::SchemaMismatch("missing choices[0].message.content".into()))?;

        serde_json::from_str::<ExtractionResponse>(content)
            .map_err(|e| LlmError::SchemaMismatch(format!("response did not match extraction schema: {e}")))
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> LlmResult<Vec<f32>> {
        let body = json!({
            "model": self.embedding_model,
            "input": text,
        });

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Embedding(e.to_string()))?;

        let status = response.status();
        let text_body = response.text().await.map_err(|e| LlmError::Embedding(e.to_string()))?;

        if !status.is_success() {
            return Err(self.classify_error(status, &text_body, true));
        }

        let envelope: serde_json::Value =
            serde_json::from_str(&text_body).map_err(|e| LlmError::Embedding(e.to_string()))?;

        let embedding = envelope
            .get("data")
            .and_then(|d| d.get(0))
            .and_then(|d| d.get("embedding"))
            .and_then(|e| e.as_array())
            .ok_or_else(|| LlmError::Embedding("missing data[0].embedding in response".into()))?;

        embedding
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32).ok_or_else(|| LlmError::Embedding("non-numeric embedding component".into())))
            .collect()
    }

    fn dimensions(&self) -> usize {
        self.embedding_dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_status_classifies_as_api_key_failure() {
        let provider = OpenAiProvider::new("sk-test".into(), "gpt-5-mini".into(), "text-embedding-3-small".into(), 1536, 30);
        let err = provider.classify_error(reqwest::StatusCode::UNAUTHORIZED, "bad key", false);
        assert!(matches!(err, LlmError::ApiKey(_)));
    }

    #[test]
    fn non_auth_failure_on_embedding_call_classifies_as_embedding_error() {
        let provider = OpenAiProvider::new("sk-test".into(), "gpt-5-mini".into(), "text-embedding-3-small".into(), 1536, 30);
        let err = provider.classify_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "oops", true);
        assert!(matches!(err, LlmError::Embedding(_)));
    }
}
