//! Expense analysis handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use super::{expenses_field, field, json_body, optional_field, require_fields, JsonBody};
use crate::{ApiResponse, AppError, AppState};
use pennywise_core::insights::{Anomaly, Recommendation, SmartInsights};
use pennywise_core::models::today;
use pennywise_core::seasonal::{analyze_seasonal, SeasonalAnalysis};
use pennywise_core::trends::SpendingTrends;
use pennywise_core::{Expense, UserProfile};

#[derive(Debug, Serialize)]
pub struct AnomaliesResponse {
    pub anomalies: Vec<Anomaly>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub trends: SpendingTrends,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: SmartInsights,
}

/// POST /api/detect-anomalies - Flag unusual expenses
///
/// `user_data` is optional; defaults fill in the user features.
pub async fn detect_anomalies(
    State(state): State<Arc<AppState>>,
    payload: JsonBody,
) -> Result<Json<ApiResponse<AnomaliesResponse>>, AppError> {
    let mut body = json_body(payload)?;
    let expenses: Vec<Expense> = expenses_field(&mut body)?;
    let profile: Option<UserProfile> = optional_field(&mut body, "user_data")?;

    let anomalies = state
        .manager
        .read()
        .await
        .detect_anomalies(&expenses, profile.as_ref())
        .map_err(AppError::from_core)?;

    Ok(ApiResponse::ok(AnomaliesResponse {
        count: anomalies.len(),
        anomalies,
    }))
}

/// POST /api/budget-recommendations - Compare predictions with history
pub async fn budget_recommendations(
    State(state): State<Arc<AppState>>,
    payload: JsonBody,
) -> Result<Json<ApiResponse<RecommendationsResponse>>, AppError> {
    let mut body = json_body(payload)?;
    require_fields(&body, &["user_data", "historical_expenses"])?;

    let profile: UserProfile = field(&mut body, "user_data")?;
    let history: Vec<Expense> = field(&mut body, "historical_expenses")?;

    let recommendations = state
        .manager
        .read()
        .await
        .generate_budget_recommendations(&profile, &history)
        .map_err(AppError::from_core)?;

    Ok(ApiResponse::ok(RecommendationsResponse {
        count: recommendations.len(),
        recommendations,
    }))
}

/// POST /api/spending-trends - Overall, per-category and monthly trends
pub async fn spending_trends(
    State(state): State<Arc<AppState>>,
    payload: JsonBody,
) -> Result<Json<ApiResponse<TrendsResponse>>, AppError> {
    let mut body = json_body(payload)?;
    let expenses: Vec<Expense> = expenses_field(&mut body)?;

    let trends = state
        .manager
        .read()
        .await
        .analyze_spending_trends(&expenses)
        .map_err(AppError::from_core)?;

    Ok(ApiResponse::ok(TrendsResponse { trends }))
}

/// POST /api/smart-insights - Predictions, anomalies, alerts and tips in one call
pub async fn smart_insights(
    State(state): State<Arc<AppState>>,
    payload: JsonBody,
) -> Result<Json<ApiResponse<InsightsResponse>>, AppError> {
    let mut body = json_body(payload)?;
    require_fields(&body, &["user_data", "expenses"])?;

    let profile: UserProfile = field(&mut body, "user_data")?;
    let expenses: Vec<Expense> = field(&mut body, "expenses")?;
    let budget_goals: BTreeMap<String, f64> =
        optional_field(&mut body, "budget_goals")?.unwrap_or_default();

    let insights = state
        .manager
        .read()
        .await
        .get_smart_insights(&profile, &expenses, &budget_goals)
        .map_err(AppError::from_core)?;

    Ok(ApiResponse::ok(InsightsResponse { insights }))
}

/// POST /api/seasonal-analysis - Per-month spending against the yearly average
///
/// Needs no trained model.
pub async fn seasonal_analysis(
    payload: JsonBody,
) -> Result<Json<ApiResponse<SeasonalAnalysis>>, AppError> {
    let mut body = json_body(payload)?;
    let expenses: Vec<Expense> = expenses_field(&mut body)?;

    Ok(ApiResponse::ok(analyze_seasonal(&expenses, today())))
}
