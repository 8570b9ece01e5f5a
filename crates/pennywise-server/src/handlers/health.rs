//! Liveness and routing fallbacks

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_trained: bool,
    pub timestamp: DateTime<Utc>,
}

/// GET /health - Liveness probe (no auth)
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_trained: state.manager.read().await.is_trained(),
        timestamp: Utc::now(),
    })
}

/// Fallback for unknown routes
pub async fn not_found() -> AppError {
    AppError::not_found("Endpoint not found")
}
