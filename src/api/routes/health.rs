use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::state::AppState;
use crate::application::IndexState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub knowledge_base: KnowledgeBaseStatus,
}

#[derive(Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum KnowledgeBaseStatus {
    Ready { chunks: usize },
    Unavailable { reason: String },
    NotLoaded,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Reports the knowledge-base state. An unavailable knowledge base is a
/// degraded-but-valid mode (advice proceeds ungrounded), so this endpoint
/// always answers 200.
pub async fn readiness_check(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let kb = match state.retriever.state() {
        IndexState::Ready { chunk_count } => KnowledgeBaseStatus::Ready {
            chunks: chunk_count,
        },
        IndexState::Unavailable { reason } => KnowledgeBaseStatus::Unavailable { reason },
        IndexState::NotLoaded => KnowledgeBaseStatus::NotLoaded,
    };

    Json(ReadinessResponse {
        status: "ready".into(),
        knowledge_base: kb,
    })
}
