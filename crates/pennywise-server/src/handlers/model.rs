//! Model management handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use super::{json_body, optional_field, JsonBody};
use crate::{ApiResponse, AppError, AppState};
use pennywise_core::{BudgetManager, ModelInfo, TrainingRecord, TrainingReport};

/// Analysis endpoints advertised by `/api/model-stats`
pub const ENDPOINTS: [&str; 8] = [
    "/api/predict-spending",
    "/api/detect-anomalies",
    "/api/budget-recommendations",
    "/api/spending-trends",
    "/api/smart-insights",
    "/api/category-predictions",
    "/api/budget-optimization",
    "/api/seasonal-analysis",
];

#[derive(Debug, Serialize)]
pub struct RetrainResponse {
    pub message: &'static str,
    pub training_results: TrainingReport,
    pub fingerprint: String,
}

#[derive(Debug, Serialize)]
pub struct ModelStatsResponse {
    pub model_info: ModelInfo,
    pub endpoints: Vec<&'static str>,
}

/// POST /api/retrain-model - Retrain on supplied records, or synthetic data
///
/// Training runs on the blocking pool into a fresh manager, which is saved to
/// the configured model path and then swapped in. Requests keep using the
/// old model until the swap. Concurrent retrains run one at a time.
pub async fn retrain_model(
    State(state): State<Arc<AppState>>,
    payload: JsonBody,
) -> Result<Json<ApiResponse<RetrainResponse>>, AppError> {
    // An empty request retrains on synthetic data
    let records: Option<Vec<TrainingRecord>> = match payload {
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        other => {
            let mut body = json_body(other)?;
            optional_field(&mut body, "training_data")?
        }
    };

    let _retraining = state.retrain_lock.lock().await;
    let config = state.manager.read().await.config().clone();
    let model_path = state.config.model_path.clone();
    let n_records = records.as_ref().map(Vec::len);

    let (manager, report, fingerprint) = tokio::task::spawn_blocking(move || {
        let mut manager = BudgetManager::new(config);
        let report = manager.train(records)?;
        let fingerprint = manager.save(&model_path)?;
        Ok::<_, pennywise_core::Error>((manager, report, fingerprint))
    })
    .await?
    .map_err(AppError::from_core)?;

    *state.manager.write().await = manager;

    info!(
        records = ?n_records,
        r2 = report.r2,
        fingerprint = %fingerprint,
        "Model retrained"
    );

    Ok(ApiResponse::ok(RetrainResponse {
        message: "Model retrained successfully",
        training_results: report,
        fingerprint,
    }))
}

/// GET /api/model-stats - Model metadata and the analysis endpoints
pub async fn model_stats(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<ModelStatsResponse>> {
    let model_info = state.manager.read().await.info();

    ApiResponse::ok(ModelStatsResponse {
        model_info,
        endpoints: ENDPOINTS.to_vec(),
    })
}
