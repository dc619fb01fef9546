//! Embedding configuration.

use docqa_core::{AppConfig, AppError, AppResult};
use std::time::Duration;

/// Embedding settings resolved from the application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "ollama", "openai", "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Maximum texts per provider call
    pub batch_size: usize,

    /// Endpoint override
    pub endpoint: Option<String>,

    /// API key for hosted providers
    pub api_key: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            batch_size: 64,
            endpoint: None,
            api_key: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl EmbeddingConfig {
    /// Resolve embedding settings from the application configuration.
    ///
    /// Provider entries in config.yaml may override the model and
    /// dimensionality of the active embedding provider.
    pub fn from_app_config(config: &AppConfig) -> Self {
        let provider = config.embedding_provider.clone();
        let provider_config = config.get_provider_config(&provider);

        let model = provider_config
            .and_then(|pc| pc.embedding_model())
            .map(str::to_string)
            .unwrap_or_else(|| config.embedding_model.clone());

        let dimensions = provider_config
            .and_then(|pc| pc.embedding_dimensions())
            .unwrap_or(config.embedding_dimensions);

        Self {
            endpoint: config.endpoint_for(&provider),
            api_key: config.resolve_api_key(&provider),
            provider,
            model,
            dimensions,
            batch_size: config.embedding_batch_size,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batch size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "mock");
        assert_eq!(config.dimensions, 384);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_app_config_defaults() {
        let app = AppConfig {
            request_timeout_secs: 15,
            ..Default::default()
        };

        let config = EmbeddingConfig::from_app_config(&app);
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "nomic-embed-text");
        assert_eq!(config.dimensions, 768);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = EmbeddingConfig {
            dimensions: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }
}
