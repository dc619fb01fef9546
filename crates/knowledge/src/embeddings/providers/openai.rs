//! OpenAI embedding provider (`/v1/embeddings`).

use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use async_trait::async_trait;
use docqa_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
    /// Only the text-embedding-3 family accepts a target dimensionality
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiProvider {
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AppError::Config("OpenAI embedding provider requires API key".to_string())
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to create HTTP client for OpenAI: {}", e))
            })?;

        let base_url = config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key,
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    fn request<'a>(&'a self, texts: &'a [String]) -> EmbeddingsRequest<'a> {
        EmbeddingsRequest {
            model: &self.model,
            input: texts,
            dimensions: self
                .model
                .starts_with("text-embedding-3")
                .then_some(self.dimensions),
        }
    }
}

/// Order embeddings by their `index` field; the API does not promise
/// response order.
fn into_ordered(mut data: Vec<EmbeddingData>) -> Vec<Vec<f32>> {
    data.sort_by_key(|d| d.index);
    data.into_iter().map(|d| d.embedding).collect()
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "openai", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let url = format!("{}/embeddings", self.base_url);
        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request(texts))
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to send request to OpenAI: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse OpenAI response: {}", e)))?;

        Ok(into_ordered(body.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: &str) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "openai".to_string(),
            model: model.to_string(),
            dimensions: 512,
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_dimensions_sent_for_v3_models() {
        let provider = OpenAiProvider::new(&config("text-embedding-3-small")).unwrap();
        let texts = vec!["hello".to_string()];
        let body = serde_json::to_value(provider.request(&texts)).unwrap();
        assert_eq!(body["dimensions"], 512);
    }

    #[test]
    fn test_dimensions_omitted_for_legacy_models() {
        let provider = OpenAiProvider::new(&config("text-embedding-ada-002")).unwrap();
        let texts = vec!["hello".to_string()];
        let body = serde_json::to_value(provider.request(&texts)).unwrap();
        assert!(body.get("dimensions").is_none());
    }

    #[test]
    fn test_response_reordered_by_index() {
        let body: EmbeddingsResponse = serde_json::from_str(
            r#"{"data":[{"index":1,"embedding":[0.0,1.0]},{"index":0,"embedding":[1.0,0.0]}]}"#,
        )
        .unwrap();

        assert_eq!(into_ordered(body.data), vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_missing_key_rejected() {
        let mut cfg = config("text-embedding-3-small");
        cfg.api_key = None;
        assert!(matches!(OpenAiProvider::new(&cfg), Err(AppError::Config(_))));
    }
}
