use std::sync::{Arc, RwLock};
use tracing::{info, instrument, warn};

use crate::domain::{
    chunk_document,
    ports::{EmbeddingService, VectorStore},
    Document, DomainError, SearchResult,
};

/// Readiness of the in-memory knowledge index. The index is built exactly
/// once before the first request; `Unavailable` is an explicit sentinel,
/// never an implicit null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexState {
    NotLoaded,
    Ready { chunk_count: usize },
    Unavailable { reason: String },
}

/// Maps a free-text query to the top-K most relevant reference chunks.
///
/// Retrieval never fails a request: an unavailable knowledge base yields an
/// empty result set, logged as a degraded lookup. Callers treat "no context
/// found" as a valid outcome and proceed without grounding text.
pub struct RetrieverService {
    embedding: Option<Arc<dyn EmbeddingService>>,
    store: Arc<dyn VectorStore>,
    state: RwLock<IndexState>,
    chunk_size: usize,
    default_top_k: usize,
    /// Similarity floor below which chunks are dropped entirely.
    /// `None` means rank-only.
    min_score: Option<f32>,
}

impl RetrieverService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        store: Arc<dyn VectorStore>,
        chunk_size: usize,
        default_top_k: usize,
        min_score: Option<f32>,
    ) -> Self {
        Self {
            embedding: Some(embedding),
            store,
            state: RwLock::new(IndexState::NotLoaded),
            chunk_size,
            default_top_k,
            min_score,
        }
    }

    /// Constructs a retriever whose embedding model failed to initialize.
    /// Every query resolves to an empty result set.
    pub fn degraded(store: Arc<dyn VectorStore>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(reason = %reason, "knowledge base unavailable, retrieval disabled");
        Self {
            embedding: None,
            store,
            state: RwLock::new(IndexState::Unavailable { reason }),
            chunk_size: 1000,
            default_top_k: 3,
            min_score: None,
        }
    }

    pub fn state(&self) -> IndexState {
        self.state
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|_| IndexState::Unavailable {
                reason: "state lock poisoned".into(),
            })
    }

    /// Builds the index from the bundled reference documents: chunk each
    /// document, embed all chunks in one batch, and upsert into the store.
    /// Any failure marks the knowledge base unavailable instead of failing
    /// startup.
    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    pub async fn load(&self, documents: &[Document]) {
        match self.build_index(documents).await {
            Ok(chunk_count) => {
                info!(chunks = chunk_count, "knowledge base ready");
                self.set_state(IndexState::Ready { chunk_count });
            }
            Err(e) => {
                warn!(error = %e, "failed to build knowledge base, retrieval disabled");
                self.set_state(IndexState::Unavailable {
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Marks the knowledge base unavailable, e.g. when the reference
    /// documents could not be read.
    pub fn mark_unavailable(&self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(reason = %reason, "knowledge base unavailable, retrieval disabled");
        self.set_state(IndexState::Unavailable { reason });
    }

    async fn build_index(&self, documents: &[Document]) -> Result<usize, DomainError> {
        let embedding = self
            .embedding
            .as_ref()
            .ok_or_else(|| DomainError::kb_unavailable("embedding model not initialized"))?;

        let chunks: Vec<_> = documents
            .iter()
            .flat_map(|doc| chunk_document(doc, self.chunk_size))
            .collect();

        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = embedding.embed_batch(&texts).await?;

        for (chunk, vector) in chunks.iter().zip(embeddings.iter()) {
            self.store.upsert(chunk, vector).await?;
        }

        Ok(chunks.len())
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>, DomainError> {
        self.retrieve_top_k(query, self.default_top_k).await
    }

    /// Top-K lookup. Returns at most `top_k` results sorted by
    /// non-increasing similarity; an empty vector when the knowledge base
    /// is unavailable or holds no chunks.
    #[instrument(skip(self))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::validation("query must not be empty"));
        }
        if top_k == 0 {
            return Err(DomainError::validation("top_k must be positive"));
        }

        match self.state() {
            IndexState::Ready { .. } => {}
            IndexState::NotLoaded => {
                warn!("knowledge base not loaded, returning empty context");
                return Ok(Vec::new());
            }
            IndexState::Unavailable { reason } => {
                warn!(reason = %reason, "knowledge base unavailable, returning empty context");
                return Ok(Vec::new());
            }
        }

        let embedding = match &self.embedding {
            Some(e) => e,
            None => return Ok(Vec::new()),
        };

        let query_vector = match embedding.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "query embedding failed, returning empty context");
                return Ok(Vec::new());
            }
        };

        let mut results = self.store.search(&query_vector, top_k).await?;
        if let Some(floor) = self.min_score {
            results.retain(|r| r.score >= floor);
        }

        Ok(results)
    }

    /// Renders retrieved chunks as the grounding block interpolated into
    /// model prompts. Empty input renders to an empty string.
    pub fn format_context(results: &[SearchResult]) -> String {
        if results.is_empty() {
            return String::new();
        }

        let mut context = String::from("RELEVANT FINANCIAL INFORMATION:\n\n");
        for result in results {
            context.push_str(&format!(
                "Source: {}\n\n{}\n\n---\n\n",
                result.chunk.topic, result.chunk.content
            ));
        }
        context
    }

    fn set_state(&self, state: IndexState) {
        if let Ok(mut guard) = self.state.write() {
            *guard = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Embedding;
    use crate::infrastructure::InMemoryVectorStore;
    use async_trait::async_trait;

    /// Deterministic keyword-bucket embedder: each dimension counts hits
    /// from a fixed vocabulary, giving stable, explainable similarities.
    struct StubEmbedding;

    const VOCAB: [&[&str]; 4] = [
        &["budget", "budgeting", "spending", "expense"],
        &["debt", "credit", "cards", "loan", "interest", "payoff"],
        &["invest", "investing", "stocks", "portfolio"],
        &["save", "savings", "emergency"],
    ];

    fn bucket_vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        VOCAB
            .iter()
            .map(|bucket| {
                words
                    .iter()
                    .filter(|w| bucket.iter().any(|kw| w.starts_with(kw)))
                    .count() as f32
            })
            .collect()
    }

    #[async_trait]
    impl EmbeddingService for StubEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            Ok(Embedding::new(bucket_vector(text)))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            Ok(texts
                .iter()
                .map(|t| Embedding::new(bucket_vector(t)))
                .collect())
        }

        fn dimension(&self) -> usize {
            VOCAB.len()
        }
    }

    struct FailingEmbedding;

    #[async_trait]
    impl EmbeddingService for FailingEmbedding {
        async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
            Err(DomainError::internal("model exploded"))
        }

        async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            Err(DomainError::internal("model exploded"))
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    fn two_topic_kb() -> Vec<Document> {
        vec![
            Document::new(
                "budgeting",
                "Budgeting means planning your spending before the month begins.\n\n\
                 Track every expense category against the budget you set.",
            ),
            Document::new(
                "debt",
                "To pay off credit cards fastest, pay the minimum on every card and \
                 put all extra money toward the highest interest balance.\n\n\
                 Debt payoff works best when extra payments stay consistent.",
            ),
        ]
    }

    fn retriever_with(embedding: Arc<dyn EmbeddingService>, min_score: Option<f32>) -> RetrieverService {
        RetrieverService::new(
            embedding,
            Arc::new(InMemoryVectorStore::new()),
            1000,
            3,
            min_score,
        )
    }

    #[tokio::test]
    async fn test_returns_at_most_k_sorted_descending() {
        let retriever = retriever_with(Arc::new(StubEmbedding), None);
        retriever.load(&two_topic_kb()).await;

        for k in 1..=5 {
            let results = retriever
                .retrieve_top_k("budget spending debt savings", k)
                .await
                .unwrap();
            assert!(results.len() <= k);
            for pair in results.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
        }
    }

    #[tokio::test]
    async fn test_credit_card_query_hits_debt_topic() {
        let retriever = retriever_with(Arc::new(StubEmbedding), None);
        retriever.load(&two_topic_kb()).await;

        let results = retriever
            .retrieve_top_k("how do I pay off credit cards fastest", 1)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.topic, "debt");
    }

    #[tokio::test]
    async fn test_empty_kb_returns_empty() {
        let retriever = retriever_with(Arc::new(StubEmbedding), None);
        retriever.load(&[]).await;

        assert_eq!(retriever.state(), IndexState::Ready { chunk_count: 0 });
        let results = retriever.retrieve("anything at all").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unloaded_kb_returns_empty() {
        let retriever = retriever_with(Arc::new(StubEmbedding), None);
        let results = retriever.retrieve("anything").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_degraded_retriever_returns_empty() {
        let retriever =
            RetrieverService::degraded(Arc::new(InMemoryVectorStore::new()), "no model");
        assert!(matches!(
            retriever.state(),
            IndexState::Unavailable { .. }
        ));

        let results = retriever.retrieve("budget help").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_failed_index_build_marks_unavailable() {
        let retriever = retriever_with(Arc::new(FailingEmbedding), None);
        retriever.load(&two_topic_kb()).await;

        assert!(matches!(
            retriever.state(),
            IndexState::Unavailable { .. }
        ));
        let results = retriever.retrieve("budget").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_idempotent_retrieval() {
        let retriever = retriever_with(Arc::new(StubEmbedding), None);
        retriever.load(&two_topic_kb()).await;

        let first = retriever.retrieve_top_k("credit card payoff", 2).await.unwrap();
        let second = retriever.retrieve_top_k("credit card payoff", 2).await.unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.chunk.id, b.chunk.id);
            assert_eq!(a.score, b.score);
        }
    }

    #[tokio::test]
    async fn test_k_larger_than_chunk_count_returns_all() {
        let retriever = retriever_with(Arc::new(StubEmbedding), None);
        let kb = two_topic_kb();
        retriever.load(&kb).await;

        let total = match retriever.state() {
            IndexState::Ready { chunk_count } => chunk_count,
            other => panic!("unexpected state: {other:?}"),
        };
        let results = retriever
            .retrieve_top_k("budget debt savings investing", total + 10)
            .await
            .unwrap();
        assert_eq!(results.len(), total);
    }

    #[tokio::test]
    async fn test_min_score_excludes_unrelated_chunks() {
        let retriever = retriever_with(Arc::new(StubEmbedding), Some(0.5));
        retriever.load(&two_topic_kb()).await;

        let results = retriever
            .retrieve_top_k("pay off credit card debt", 10)
            .await
            .unwrap();

        assert!(!results.is_empty());
        for result in &results {
            assert!(result.score >= 0.5);
            assert_eq!(result.chunk.topic, "debt");
        }
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let retriever = retriever_with(Arc::new(StubEmbedding), None);
        retriever.load(&two_topic_kb()).await;

        let err = retriever.retrieve("   ").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = retriever.retrieve_top_k("budget", 0).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_format_context() {
        let retriever = retriever_with(Arc::new(StubEmbedding), None);
        retriever.load(&two_topic_kb()).await;

        let results = retriever.retrieve("credit card debt").await.unwrap();
        let context = RetrieverService::format_context(&results);

        assert!(context.starts_with("RELEVANT FINANCIAL INFORMATION:"));
        assert!(context.contains("Source: debt"));

        assert_eq!(RetrieverService::format_context(&[]), "");
    }
}
