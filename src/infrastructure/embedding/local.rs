use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use tracing::info;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};

/// Embedding dimensionality of all-MiniLM-L6-v2.
pub const EMBEDDING_DIMENSION: usize = 384;

/// Local sentence-embedding model (all-MiniLM-L6-v2 over ONNX). Loaded once
/// at startup; every subsequent embed call runs in-process with no network
/// traffic. Inference is CPU-bound, so calls hop to the blocking pool.
pub struct LocalEmbedding {
    model: Arc<TextEmbedding>,
}

impl LocalEmbedding {
    pub fn try_new() -> Result<Self, DomainError> {
        let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(false);
        let model = TextEmbedding::try_new(options)
            .map_err(|e| DomainError::kb_unavailable(format!("embedding model init: {e}")))?;
        info!(model = "all-MiniLM-L6-v2", dimension = EMBEDDING_DIMENSION, "embedding model loaded");

        Ok(Self {
            model: Arc::new(model),
        })
    }

    async fn run_model(&self, texts: Vec<String>) -> Result<Vec<Embedding>, DomainError> {
        let model = self.model.clone();
        let vectors = tokio::task::spawn_blocking(move || model.embed(texts, None))
            .await
            .map_err(|e| DomainError::internal(format!("embedding task panicked: {e}")))?
            .map_err(|e| DomainError::internal(format!("embedding failed: {e}")))?;

        Ok(vectors.into_iter().map(Embedding::new).collect())
    }
}

#[async_trait]
impl EmbeddingService for LocalEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let mut vectors = self.run_model(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| DomainError::internal("no embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        self.run_model(owned).await
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}
