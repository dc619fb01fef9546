//! Configuration management for docqa.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults (local-first Ollama)
//! - `.env` file (loaded into the process environment)
//! - Environment variables (`DOCQA_*`)
//! - Config file (`.docqa/config.yaml`)
//! - Command-line flags
//!
//! All runtime state lives under `<workspace>/.docqa/`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Name of the per-workspace state directory.
pub const STATE_DIR: &str = ".docqa";

const KNOWN_LLM_PROVIDERS: [&str; 2] = ["ollama", "openai"];
const KNOWN_EMBEDDING_PROVIDERS: [&str; 3] = ["ollama", "openai", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .docqa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Language-model provider ("ollama", "openai")
    pub provider: String,

    /// Language-model identifier
    pub model: String,

    /// Embedding provider ("ollama", "openai", "mock")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Output dimensionality of the embedding model
    pub embedding_dimensions: usize,

    /// Maximum number of texts per embedding request
    pub embedding_batch_size: usize,

    /// API key override (applies to every provider that needs one)
    pub api_key: Option<String>,

    /// Timeout for a single provider request, in seconds
    pub request_timeout_secs: u64,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider table from config.yaml
    pub llm: Option<LlmConfig>,
}

/// LLM section of config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(rename = "activeEmbeddingProvider")]
    pub active_embedding_provider: String,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        #[serde(rename = "embeddingDimensions")]
        embedding_dimensions: Option<usize>,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        #[serde(rename = "embeddingDimensions")]
        embedding_dimensions: Option<usize>,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Chat/completion model for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Embedding model, if configured.
    pub fn embedding_model(&self) -> Option<&str> {
        match self {
            Self::OpenAI {
                embedding_model, ..
            }
            | Self::Ollama {
                embedding_model, ..
            } => embedding_model.as_deref(),
        }
    }

    /// Embedding dimensionality, if configured.
    pub fn embedding_dimensions(&self) -> Option<usize> {
        match self {
            Self::OpenAI {
                embedding_dimensions,
                ..
            }
            | Self::Ollama {
                embedding_dimensions,
                ..
            } => *embedding_dimensions,
        }
    }

    /// Endpoint override, if configured.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    #[serde(rename = "requestTimeoutSecs")]
    request_timeout_secs: Option<u64>,
    #[serde(rename = "embeddingBatchSize")]
    embedding_batch_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            embedding_provider: "ollama".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dimensions: 768,
            embedding_batch_size: 64,
            api_key: None,
            request_timeout_secs: 60,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, environment variables and config.yaml.
    ///
    /// Environment variables:
    /// - `DOCQA_WORKSPACE`: Override workspace path
    /// - `DOCQA_CONFIG`: Path to config file
    /// - `DOCQA_PROVIDER` / `DOCQA_MODEL`: Language model selection
    /// - `DOCQA_EMBEDDING_PROVIDER` / `DOCQA_EMBEDDING_MODEL`: Embedding selection
    /// - `DOCQA_API_KEY`: API key for any provider
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace and config file.
    ///
    /// Both take precedence over `DOCQA_WORKSPACE` and `DOCQA_CONFIG`, and
    /// decide which config.yaml is merged.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(AppError::Config(format!("Failed to read .env: {}", e))),
        }

        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var_os("DOCQA_WORKSPACE").map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var_os("DOCQA_CONFIG").map(PathBuf::from));

        let mut config = config.merge_config_file()?;

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("DOCQA_PROVIDER") {
            config.provider = provider;
        }
        if let Ok(model) = std::env::var("DOCQA_MODEL") {
            config.model = model;
        }
        if let Ok(provider) = std::env::var("DOCQA_EMBEDDING_PROVIDER") {
            config.embedding_provider = provider;
        }
        if let Ok(model) = std::env::var("DOCQA_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }

        config.api_key = std::env::var("DOCQA_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge the config file for this workspace, if there is one.
    ///
    /// An explicit `config_file` must exist; the workspace default
    /// `.docqa/config.yaml` is optional.
    fn merge_config_file(self) -> AppResult<Self> {
        if !self.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                self.workspace
            )));
        }

        match self.config_file.clone() {
            Some(path) if !path.exists() => Err(AppError::Config(format!(
                "Config file not found: {:?}",
                path
            ))),
            Some(path) => self.merge_yaml(&path),
            None => {
                let default_path = self.state_dir().join("config.yaml");
                if default_path.exists() {
                    self.merge_yaml(&default_path)
                } else {
                    Ok(self)
                }
            }
        }
    }

    /// Merge a YAML configuration file into a copy of this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(timeout) = config_file.request_timeout_secs {
            result.request_timeout_secs = timeout;
        }

        if let Some(batch_size) = config_file.embedding_batch_size {
            result.embedding_batch_size = batch_size.max(1);
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
                if let ProviderConfig::Ollama {
                    timeout: Some(timeout),
                    ..
                } = provider_config
                {
                    result.request_timeout_secs = *timeout;
                }
            }

            result.embedding_provider = llm.active_embedding_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_embedding_provider) {
                if let Some(model) = provider_config.embedding_model() {
                    result.embedding_model = model.to_string();
                }
                if let Some(dimensions) = provider_config.embedding_dimensions() {
                    result.embedding_dimensions = dimensions;
                }
            }

            result.llm = Some(llm);
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment and config file.
    /// Workspace and config path are passed to [`AppConfig::load_from`]
    /// instead, since they decide which config file is read.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Path to the `.docqa` state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(STATE_DIR)
    }

    /// Directory where uploaded documents are stored.
    pub fn uploads_dir(&self) -> PathBuf {
        self.state_dir().join("uploads")
    }

    /// Storage location of the persisted vector index.
    pub fn index_dir(&self) -> PathBuf {
        self.state_dir().join("index")
    }

    /// Directory holding page images produced by the external renderer.
    pub fn pages_dir(&self) -> PathBuf {
        self.state_dir().join("pages")
    }

    /// Directory holding prompt template overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.state_dir().join("prompts")
    }

    /// Ensure the `.docqa` directory exists.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let state_dir = self.state_dir();
        if !state_dir.exists() {
            std::fs::create_dir_all(&state_dir).map_err(|e| {
                AppError::Config(format!("Failed to create {} directory: {}", STATE_DIR, e))
            })?;
        }
        Ok(())
    }

    /// Get a provider's configuration from config.yaml.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint override for a provider, if any.
    pub fn endpoint_for(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint())
            .map(str::to_string)
    }

    /// Resolve the API key for a provider.
    ///
    /// Order: `DOCQA_API_KEY`, the provider's `apiKeyEnv`, then
    /// `OPENAI_API_KEY` for the OpenAI provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.get_provider_config(provider)
        {
            if let Ok(key) = std::env::var(api_key_env) {
                return Some(key);
            }
        }

        if provider == "openai" {
            return std::env::var("OPENAI_API_KEY").ok();
        }

        None
    }

    /// Validate configuration for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_LLM_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding_dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        for provider in [&self.provider, &self.embedding_provider] {
            if provider == "openai" && self.resolve_api_key(provider).is_none() {
                return Err(AppError::Config(
                    "API key not found for provider 'openai'. Set OPENAI_API_KEY or DOCQA_API_KEY"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.embedding_model, "nomic-embed-text");
        assert_eq!(config.embedding_dimensions, 768);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_state_paths() {
        let config = AppConfig::default();
        assert!(config.state_dir().ends_with(".docqa"));
        assert!(config.index_dir().ends_with(".docqa/index"));
        assert!(config.pages_dir().ends_with(".docqa/pages"));
        assert!(config.uploads_dir().ends_with(".docqa/uploads"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("openai".to_string()),
            Some("gpt-4o-mini".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "openai");
        assert_eq!(overridden.model, "gpt-4o-mini");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_selects_providers() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: openai
  activeEmbeddingProvider: openai
  providers:
    openai:
      apiKeyEnv: MY_OPENAI_KEY
      model: gpt-4o-mini
      embeddingModel: text-embedding-3-small
      embeddingDimensions: 1536
logging:
  level: warn
  color: false
requestTimeoutSecs: 15
"#,
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.provider, "openai");
        assert_eq!(merged.model, "gpt-4o-mini");
        assert_eq!(merged.embedding_provider, "openai");
        assert_eq!(merged.embedding_model, "text-embedding-3-small");
        assert_eq!(merged.embedding_dimensions, 1536);
        assert_eq!(merged.request_timeout_secs, 15);
        assert_eq!(merged.log_level.as_deref(), Some("warn"));
        assert!(merged.no_color);
    }

    #[test]
    fn test_merge_yaml_ollama_endpoint() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: ollama
  activeEmbeddingProvider: ollama
  providers:
    ollama:
      endpoint: http://gpu-box:11434
      model: mistral
      timeout: 120
"#,
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.model, "mistral");
        assert_eq!(merged.request_timeout_secs, 120);
        assert_eq!(
            merged.endpoint_for("ollama").as_deref(),
            Some("http://gpu-box:11434")
        );
    }

    fn workspace_with_config(yaml: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let state = temp.path().join(STATE_DIR);
        std::fs::create_dir_all(&state).unwrap();
        std::fs::write(state.join("config.yaml"), yaml).unwrap();
        temp
    }

    #[test]
    fn test_config_file_follows_workspace() {
        let temp = workspace_with_config(
            r#"
llm:
  activeProvider: ollama
  activeEmbeddingProvider: mock
  providers:
    mock:
      endpoint: unused
      model: unused
      embeddingModel: trigram-v1
      embeddingDimensions: 256
embeddingBatchSize: 8
"#,
        );

        let config = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..AppConfig::default()
        }
        .merge_config_file()
        .unwrap();

        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.embedding_provider, "mock");
        assert_eq!(config.embedding_model, "trigram-v1");
        assert_eq!(config.embedding_dimensions, 256);
        assert_eq!(config.embedding_batch_size, 8);
    }

    #[test]
    fn test_explicit_config_file_wins_over_workspace_default() {
        let temp = workspace_with_config("requestTimeoutSecs: 5\n");
        let explicit = temp.path().join("other.yaml");
        std::fs::write(&explicit, "requestTimeoutSecs: 90\n").unwrap();

        let config = AppConfig {
            workspace: temp.path().to_path_buf(),
            config_file: Some(explicit),
            ..AppConfig::default()
        }
        .merge_config_file()
        .unwrap();

        assert_eq!(config.request_timeout_secs, 90);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig {
            workspace: temp.path().to_path_buf(),
            config_file: Some(temp.path().join("absent.yaml")),
            ..AppConfig::default()
        }
        .merge_config_file();

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_workspace_without_config_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..AppConfig::default()
        }
        .merge_config_file()
        .unwrap();

        assert_eq!(config.embedding_provider, "ollama");
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn test_missing_workspace_rejected() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig {
            workspace: temp.path().join("nope"),
            ..AppConfig::default()
        }
        .merge_config_file();

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_merge_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "llm: [unclosed").unwrap();

        let result = AppConfig::default().merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_embedding_provider() {
        let mut config = AppConfig::default();
        config.embedding_provider = "word2vec".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let mut config = AppConfig::default();
        config.api_key = Some("explicit".to_string());
        assert_eq!(config.resolve_api_key("openai").as_deref(), Some("explicit"));
    }
}
