pub mod config;
pub mod embedding;
pub mod knowledge;
pub mod llm;
pub mod vector_store;

pub use config::{AppConfig, ConfigError};
pub use embedding::{LocalEmbedding, EMBEDDING_DIMENSION};
pub use knowledge::load_documents;
pub use llm::AnthropicLlm;
pub use vector_store::InMemoryVectorStore;
