pub mod indexer;
pub mod loader;
pub mod ollama;
pub mod ollama_embedding_provider;
pub mod providers;
pub mod retriever;
pub mod snapshot;
pub mod splitter;
pub mod store;

pub use indexer::*;
pub use loader::*;
pub use ollama::*;
pub use ollama_embedding_provider::*;
pub use providers::*;
pub use retriever::*;
pub use snapshot::*;
pub use splitter::*;
pub use store::*;
