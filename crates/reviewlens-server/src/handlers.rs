//! API route handlers.
//!
//! Analysis is CPU-bound, so each request runs it on the blocking pool.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::debug;

use reviewlens_core::{AnalysisResult, CacheClearReport, ReviewAnalyzer};

use crate::error::{ApiError, Result};
use crate::extract::ApiJson;
use crate::models::{AnalyzeRequest, BatchRequest, BatchResponse, HealthResponse};
use crate::state::AppState;

async fn run_blocking<T, F>(analyzer: &Arc<ReviewAnalyzer>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&ReviewAnalyzer) -> T + Send + 'static,
{
    let analyzer = Arc::clone(analyzer);
    tokio::task::spawn_blocking(move || f(&analyzer))
        .await
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {}", e)))
}

/// POST /analyze - Analyze one review.
pub async fn analyze(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>> {
    debug!(
        review_id = req.review_id,
        content_len = req.content.len(),
        "Analyzing review"
    );

    let result = run_blocking(&state.analyzer, move |analyzer| {
        analyzer.analyze_one(req.review_id, &req.content)
    })
    .await??;

    Ok(Json(result))
}

/// POST /analyze/batch - Analyze up to 100 reviews in order.
pub async fn analyze_batch(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BatchRequest>,
) -> Result<Json<BatchResponse>> {
    debug!(count = req.reviews.len(), "Analyzing batch");

    let entries = req.into_entries();
    let batch = run_blocking(&state.analyzer, move |analyzer| {
        analyzer.analyze_entries(&entries)
    })
    .await??;

    Ok(Json(BatchResponse::from(batch)))
}

/// GET /health - Report thresholds, word-set sizes, and cache sizes.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from(state.analyzer.health_snapshot()))
}

/// POST /cache/clear - Empty both result caches.
pub async fn clear_cache(State(state): State<AppState>) -> Json<CacheClearReport> {
    Json(state.analyzer.clear_all_caches())
}
