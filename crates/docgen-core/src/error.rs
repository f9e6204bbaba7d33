use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocGenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::ConfigError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector error: {0}")]
    Vector(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("External service error: {0}")]
    External(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DocGenError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DocGenError>;
