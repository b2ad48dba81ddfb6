use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::domain::{FinancialProfile, Insight};

#[derive(Debug, Deserialize)]
pub struct InsightsRequest {
    pub profile: FinancialProfile,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: Vec<Insight>,
    pub summary: ProfileSummary,
}

/// Headline aggregates the dashboard renders next to the insight list.
#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub monthly_cashflow: f64,
    pub savings_rate_pct: f64,
    pub debt_to_income_pct: f64,
    pub portfolio_value: f64,
    pub net_worth: f64,
}

pub async fn generate_insights(
    State(state): State<AppState>,
    Json(request): Json<InsightsRequest>,
) -> Json<InsightsResponse> {
    let profile = &request.profile;
    let insights = state.insights.generate(profile);

    Json(InsightsResponse {
        insights,
        summary: ProfileSummary {
            total_income: profile.total_income(),
            total_expenses: profile.total_expenses(),
            monthly_cashflow: profile.monthly_cashflow(),
            savings_rate_pct: profile.savings_rate(),
            debt_to_income_pct: profile.debt_to_income_ratio(),
            portfolio_value: profile.portfolio_value(),
            net_worth: profile.net_worth(),
        },
    })
}
