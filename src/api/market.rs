//! Game data endpoints: terrain, obstacles, events and enemies.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::api::AppState;
use crate::domain::{DateUnix, MergedPoint};
use crate::error::AppError;

/// A terrain or enemy point. The `ma_7` key is part of the game client's
/// contract and keeps its name whatever `MA_WINDOW` is configured to.
#[derive(Debug, Serialize, PartialEq)]
pub struct TerrainPoint {
    pub date_unix: DateUnix,
    pub ma_7: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ObstaclePoint {
    pub drawdown_date_unix: DateUnix,
    pub drawdown_price: f64,
    pub drawdown: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct EventPoint {
    pub event: String,
    pub impact: String,
    pub date_unix: DateUnix,
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

impl TerrainPoint {
    fn rounded(point: &MergedPoint) -> Self {
        Self {
            date_unix: point.date_unix(),
            ma_7: round3(point.moving_average),
        }
    }

    fn raw(point: &MergedPoint) -> Self {
        Self {
            date_unix: point.date_unix(),
            ma_7: point.moving_average,
        }
    }
}

pub async fn terrain_data(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let series = state.pipeline.merged_series(Utc::now()).await?;
    let data: Vec<TerrainPoint> = series.points().iter().map(TerrainPoint::rounded).collect();

    let cache_control = format!("public, max-age={}", state.config.cache_ttl_secs);
    Ok(([(header::CACHE_CONTROL, cache_control)], Json(data)))
}

pub async fn obstacles_data(
    State(state): State<AppState>,
) -> Result<Json<Vec<ObstaclePoint>>, AppError> {
    let obstacles = state.pipeline.obstacles(Utc::now()).await?;
    let data = obstacles
        .iter()
        .map(|o| ObstaclePoint {
            drawdown_date_unix: o.trough_date_unix(),
            drawdown_price: o.trough_moving_average,
            drawdown: o.drawdown,
        })
        .collect();
    Ok(Json(data))
}

pub async fn bitcoin_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventPoint>>, AppError> {
    let events = state.pipeline.events(Utc::now()).await?;
    let data = events
        .iter()
        .map(|e| EventPoint {
            event: e.label.clone(),
            impact: e.impact.clone(),
            date_unix: e.date_unix(),
        })
        .collect();
    Ok(Json(data))
}

pub async fn enemies_data(
    State(state): State<AppState>,
) -> Result<Json<Vec<TerrainPoint>>, AppError> {
    let sampled = state
        .pipeline
        .enemies(state.config.num_enemies, Utc::now())
        .await?;
    Ok(Json(sampled.iter().map(TerrainPoint::raw).collect()))
}
