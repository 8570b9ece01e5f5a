//! Spending prediction handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use super::{field, json_body, parse, require_fields, JsonBody};
use crate::{ApiResponse, AppError, AppState};
use pennywise_core::insights::{BudgetOptimization, SpendingPrediction};
use pennywise_core::{Category, UserProfile};

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: SpendingPrediction,
}

#[derive(Debug, Serialize)]
pub struct CategoryPredictionsResponse {
    pub predictions: BTreeMap<String, SpendingPrediction>,
    pub categories: Vec<String>,
}

/// POST /api/predict-spending - Predict spending for one category
///
/// The body is the user profile; `user_income`, `user_age` and `category`
/// are required.
pub async fn predict_spending(
    State(state): State<Arc<AppState>>,
    payload: JsonBody,
) -> Result<Json<ApiResponse<PredictionResponse>>, AppError> {
    let body = json_body(payload)?;
    require_fields(&body, &["user_income", "user_age", "category"])?;
    let profile: UserProfile = parse(body, "user data")?;

    let prediction = state
        .manager
        .read()
        .await
        .predict_spending(&profile)
        .map_err(AppError::from_core)?;

    Ok(ApiResponse::ok(PredictionResponse { prediction }))
}

/// POST /api/category-predictions - Predict spending for every category
pub async fn category_predictions(
    State(state): State<Arc<AppState>>,
    payload: JsonBody,
) -> Result<Json<ApiResponse<CategoryPredictionsResponse>>, AppError> {
    let body = json_body(payload)?;
    require_fields(&body, &["user_income", "user_age"])?;
    let profile: UserProfile = parse(body, "user data")?;

    let predictions = state
        .manager
        .read()
        .await
        .category_predictions(&profile)
        .map_err(AppError::from_core)?;
    let categories = Category::names();

    Ok(ApiResponse::ok(CategoryPredictionsResponse {
        predictions,
        categories,
    }))
}

/// POST /api/budget-optimization - Reallocate a total budget by predicted spend
pub async fn budget_optimization(
    State(state): State<Arc<AppState>>,
    payload: JsonBody,
) -> Result<Json<ApiResponse<BudgetOptimization>>, AppError> {
    let mut body = json_body(payload)?;
    require_fields(&body, &["user_data", "current_budget", "total_budget"])?;

    let profile: UserProfile = field(&mut body, "user_data")?;
    let current_budget: BTreeMap<String, f64> = field(&mut body, "current_budget")?;
    let total_budget: f64 = field(&mut body, "total_budget")?;

    if !total_budget.is_finite() || total_budget < 0.0 {
        return Err(AppError::bad_request(
            "total_budget must be a non-negative number",
        ));
    }

    let optimization = state
        .manager
        .read()
        .await
        .optimize_budget(&profile, &current_budget, total_budget)
        .map_err(AppError::from_core)?;

    Ok(ApiResponse::ok(optimization))
}
