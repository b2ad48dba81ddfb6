use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Maps text into the shared vector space. Implementations run locally;
/// no network call is made per query once the model is loaded.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn dimension(&self) -> usize;
}
