use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finadvisor::api::{create_router, AppState};
use finadvisor::application::{AdvisorService, InsightsService, RetrieverService};
use finadvisor::domain::ports::{EmbeddingService, VectorStore};
use finadvisor::infrastructure::{
    load_documents, AnthropicLlm, AppConfig, InMemoryVectorStore, LocalEmbedding,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finadvisor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
    let retriever = Arc::new(build_retriever(&config, store).await);

    let llm = Arc::new(AnthropicLlm::from_config(&config.llm));
    let advisor = Arc::new(AdvisorService::new(
        llm,
        retriever.clone(),
        config.advisors.prompts.clone(),
        config.advisors.voting_threshold,
    ));
    let insights = Arc::new(InsightsService::new());

    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| config.server.host.clone());
    let port: u16 = match std::env::var("SERVER_PORT") {
        Ok(raw) => raw.parse()?,
        Err(_) => config.server.port,
    };

    let state = AppState::new(advisor, retriever, insights, config);
    let app = create_router(state);

    let addr = SocketAddr::new(host.parse()?, port);
    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the knowledge retriever. Every failure along the way degrades to
/// an unavailable knowledge base; the service starts regardless and answers
/// without grounding context.
async fn build_retriever(config: &AppConfig, store: Arc<dyn VectorStore>) -> RetrieverService {
    let embedding: Arc<dyn EmbeddingService> = match LocalEmbedding::try_new() {
        Ok(model) => Arc::new(model),
        Err(e) => {
            warn!(error = %e, "embedding model failed to load");
            return RetrieverService::degraded(store, e.to_string());
        }
    };

    let retriever = RetrieverService::new(
        embedding,
        store,
        config.retrieval.chunk_size,
        config.retrieval.top_k,
        config.retrieval.min_score,
    );

    match load_documents(&config.retrieval.kb_dir) {
        Ok(documents) => retriever.load(&documents).await,
        Err(e) => retriever.mark_unavailable(e.to_string()),
    }

    retriever
}
