pub mod chain;
pub mod llm_factory;
pub mod llm_provider;
pub mod ollama_provider;
pub mod prompt;

pub use chain::*;
pub use llm_factory::*;
pub use llm_provider::*;
pub use ollama_provider::*;
pub use prompt::*;
