use axum::extract::State;
use axum::Json;

use crate::api::AppState;

/// Force the daily cache sweep now.
pub async fn clear_cache(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.pipeline.clear_cache(chrono::Utc::now());
    Json(serde_json::json!({"message": "Cache cleared successfully"}))
}
