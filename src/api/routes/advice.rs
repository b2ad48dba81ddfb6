use axum::{extract::State, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::application::{AdvisorReply, HolisticAdvice};
use crate::domain::{FinancialProfile, Persona};

#[derive(Debug, Deserialize)]
pub struct AdviceRequest {
    pub persona: Persona,
    pub query: String,
    #[serde(default)]
    pub profile: FinancialProfile,
}

#[derive(Debug, Deserialize)]
pub struct HolisticAdviceRequest {
    pub query: String,
    #[serde(default)]
    pub profile: FinancialProfile,
}

pub async fn persona_advice(
    State(state): State<AppState>,
    Json(request): Json<AdviceRequest>,
) -> Result<Json<AdvisorReply>, ApiError> {
    let reply = state
        .advisor
        .advise(request.persona, &request.query, &request.profile)
        .await?;
    Ok(Json(reply))
}

pub async fn holistic_advice(
    State(state): State<AppState>,
    Json(request): Json<HolisticAdviceRequest>,
) -> Result<Json<HolisticAdvice>, ApiError> {
    let advice = state
        .advisor
        .holistic(&request.query, &request.profile)
        .await?;
    Ok(Json(advice))
}
