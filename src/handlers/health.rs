//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use crate::classifier::EngineStatus;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model: EngineStatus,
    datasets: Option<usize>,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let datasets = match state.store.list().await {
        Ok(files) => Some(files.len()),
        Err(e) => {
            tracing::warn!("Failed to list datasets: {}", e);
            None
        }
    };

    Json(HealthResponse {
        status: if datasets.is_some() { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model: state.classifier.status(),
        datasets,
    })
}
