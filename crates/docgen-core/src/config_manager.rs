use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for DocGen
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocGenConfig {
    /// Example document corpus
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Text splitting settings
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// LLM configuration for document generation
    #[serde(default)]
    pub llm: LLMConfig,

    /// Index snapshot settings
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding the example FRS/Design PDFs
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: PathBuf,

    /// Glob, relative to `pdf_dir`, selecting the files to load
    #[serde(default = "default_glob")]
    pub glob: String,

    /// Log and skip PDFs that fail to parse instead of aborting the load
    #[serde(default = "default_true")]
    pub skip_unreadable: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            pdf_dir: default_pdf_dir(),
            glob: default_glob(),
            skip_unreadable: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            separator: default_separator(),
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider: "ollama"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier (e.g., "all-minilm" for all-MiniLM-L6-v2)
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Ollama URL
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Texts sent per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_embedding_model(),
            ollama_url: default_ollama_url(),
            batch_size: default_batch_size(),
            timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of corpus chunks handed to the prompt as context
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

/// LLM configuration for document generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// LLM provider: "ollama"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier (e.g., "llama3")
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Ollama URL
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Sampling temperature; unset leaves the model default in place
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_llm_model(),
            ollama_url: default_ollama_url(),
            temperature: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexConfig {
    /// Where to persist the built index; unset keeps it in memory only
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the CLI writes generated documents into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Generated documents kept available for download by the server
    #[serde(default = "default_retain_documents")]
    pub retain_documents: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_name: default_file_name(),
            retain_documents: default_retain_documents(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_pdf_dir() -> PathBuf {
    PathBuf::from("pdfs/")
}
fn default_glob() -> String {
    "**/*.pdf".to_string()
}
fn default_true() -> bool {
    true
}
fn default_chunk_size() -> usize {
    500
}
fn default_chunk_overlap() -> usize {
    50
}
fn default_separator() -> String {
    "\n\n".to_string()
}
fn default_provider() -> String {
    "ollama".to_string()
}
fn default_embedding_model() -> String {
    "all-minilm".to_string()
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_batch_size() -> usize {
    32
}
fn default_embedding_timeout_secs() -> u64 {
    60
}
fn default_top_k() -> usize {
    5
}
fn default_llm_model() -> String {
    "llama3".to_string()
}
fn default_llm_timeout_secs() -> u64 {
    300
} // full documents take a while on local hardware
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_file_name() -> String {
    "Generated_Document.docx".to_string()
}
fn default_retain_documents() -> usize {
    32
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8501
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

const SUPPORTED_PROVIDERS: &[&str] = &["ollama"];

/// Configuration manager with smart defaults
pub struct ConfigManager {
    config: DocGenConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (./.docgen.toml, then ~/.docgen/config.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        info!("Loading DocGen configuration...");

        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        Self::finish(config, config_path)
    }

    /// Load an explicit config file; environment overrides still apply.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        Self::load_dotenv();

        let config = Self::read_toml_file(path)?;
        Self::finish(config, Some(path.to_path_buf()))
    }

    /// Wrap an already-built configuration (no files, no environment).
    pub fn from_config(config: DocGenConfig) -> Result<Self, ConfigError> {
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    fn finish(config: DocGenConfig, config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::apply_overrides(config, |key| std::env::var(key).ok());

        Self::validate_config(&config)?;

        info!("Configuration loaded successfully");
        if let Some(ref path) = config_path {
            info!("   Config file: {}", path.display());
        } else {
            info!("   Config file: NONE (using defaults)");
        }
        info!("   Corpus: {}", config.corpus.pdf_dir.display());
        info!(
            "   Embedding: {} via {}",
            config.embedding.model, config.embedding.ollama_url
        );
        info!("   LLM: {} via {}", config.llm.model, config.llm.ollama_url);

        Ok(Self {
            config,
            config_path,
        })
    }

    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("Loaded .env file from current directory");
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.docgen.toml (current directory)
    /// 2. ~/.docgen/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(DocGenConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".docgen.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".docgen").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        info!("No config file found, using defaults");
        Ok((DocGenConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<DocGenConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply overrides from a key lookup (the process environment in practice).
    pub fn apply_overrides<F>(mut config: DocGenConfig, lookup: F) -> DocGenConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("DOCGEN_PDF_DIR") {
            config.corpus.pdf_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("DOCGEN_OLLAMA_URL") {
            config.embedding.ollama_url = url.clone();
            config.llm.ollama_url = url;
        }
        if let Some(model) = lookup("DOCGEN_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Some(model) = lookup("DOCGEN_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Some(k) = lookup("DOCGEN_TOP_K").and_then(|v| v.parse().ok()) {
            config.retrieval.top_k = k;
        }
        if let Some(size) = lookup("DOCGEN_CHUNK_SIZE").and_then(|v| v.parse().ok()) {
            config.chunking.chunk_size = size;
        }
        if let Some(overlap) = lookup("DOCGEN_CHUNK_OVERLAP").and_then(|v| v.parse().ok()) {
            config.chunking.chunk_overlap = overlap;
        }
        if let Some(path) = lookup("DOCGEN_INDEX_CACHE") {
            config.index.cache_path = Some(PathBuf::from(path));
        }
        if let Some(host) = lookup("DOCGEN_HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("DOCGEN_PORT").and_then(|v| v.parse().ok()) {
            config.server.port = port;
        }
        if let Some(level) = lookup("DOCGEN_LOG_LEVEL") {
            config.logging.level = level;
        }

        config
    }

    pub fn validate_config(config: &DocGenConfig) -> Result<(), ConfigError> {
        let chunking = &config.chunking;
        if chunking.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "chunking.chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunking.chunk_overlap > chunking.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "chunking.chunk_overlap ({}) is larger than chunking.chunk_size ({})",
                chunking.chunk_overlap, chunking.chunk_size
            )));
        }
        if config.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be greater than 0".to_string(),
            ));
        }
        if config.embedding.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.batch_size must be greater than 0".to_string(),
            ));
        }
        if config.export.retain_documents == 0 {
            return Err(ConfigError::ValidationError(
                "export.retain_documents must be greater than 0".to_string(),
            ));
        }

        for (section, provider, model) in [
            (
                "embedding",
                &config.embedding.provider,
                &config.embedding.model,
            ),
            ("llm", &config.llm.provider, &config.llm.model),
        ] {
            if !SUPPORTED_PROVIDERS.contains(&provider.to_lowercase().as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "{}.provider '{}' is not supported. Available providers: {}",
                    section,
                    provider,
                    SUPPORTED_PROVIDERS.join(", ")
                )));
            }
            if model.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{}.model must not be empty",
                    section
                )));
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &DocGenConfig {
        &self.config
    }

    pub fn into_config(self) -> DocGenConfig {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(&self.config).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
