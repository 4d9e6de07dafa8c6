pub mod admin;
pub mod health;
pub mod leaderboard;
pub mod market;

use crate::config::Config;
use crate::db::Repository;
use crate::orchestration::Pipeline;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub pipeline: Arc<Pipeline>,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, pipeline: Arc<Pipeline>, config: Config) -> Self {
        Self {
            repo,
            pipeline,
            config,
        }
    }
}

/// Run the daily cache sweep on request arrival.
async fn daily_refresh(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.pipeline.maybe_daily_refresh(chrono::Utc::now());
    next.run(request).await
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/terrain_data", get(market::terrain_data))
        .route("/obstacles_data", get(market::obstacles_data))
        .route("/bitcoin_events", get(market::bitcoin_events))
        .route("/enemies_data", get(market::enemies_data))
        .route("/submit_score", post(leaderboard::submit_score))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/clear_cache", post(admin::clear_cache));

    if let Some(dir) = state.config.static_dir.clone() {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), daily_refresh))
        .layer(cors)
        .with_state(state)
}
