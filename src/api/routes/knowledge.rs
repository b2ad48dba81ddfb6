use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub topic: String,
    pub content: String,
    pub score: f32,
    pub chunk_index: usize,
}

/// Raw retrieval, mostly for the dashboard's knowledge lookups and for
/// inspecting what grounding a query would get.
pub async fn search_knowledge(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let results = match request.top_k {
        Some(top_k) => state.retriever.retrieve_top_k(&request.query, top_k).await?,
        None => state.retriever.retrieve(&request.query).await?,
    };

    let hits = results
        .into_iter()
        .map(|r| SearchHit {
            topic: r.chunk.topic,
            content: r.chunk.content,
            score: r.score,
            chunk_index: r.chunk.chunk_index,
        })
        .collect();

    Ok(Json(SearchResponse { results: hits }))
}
