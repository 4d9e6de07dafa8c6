use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::AppState;
use crate::domain::{LeaderboardEntry, NewScore, SortField, SortOrder, ValidationError};
use crate::error::AppError;

pub const ENTRIES_PER_PAGE: i64 = 10;

/// All fields are optional and parsed leniently; bad values fall back to
/// defaults instead of failing the request.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub page: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LeaderboardRow {
    pub player_name: String,
    pub score: i64,
    pub hodl: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardRow>,
    pub total_pages: i64,
    pub current_page: i64,
}

impl From<LeaderboardEntry> for LeaderboardRow {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            player_name: entry.player_name,
            score: entry.score,
            hodl: entry.hodl,
            timestamp: entry.created_at.to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }
}

pub async fn submit_score(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected score submission body");
        AppError::from(ValidationError::InvalidBody)
    })?;
    let score = NewScore::from_json(&body)?;

    let entry = state.repo.insert_entry(&score, Utc::now()).await?;
    tracing::info!(
        id = %entry.id,
        player = %entry.player_name,
        score = entry.score,
        hodl = entry.hodl,
        "Score submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Score submitted successfully"})),
    ))
}

pub async fn get_leaderboard(
    Query(params): Query<LeaderboardQuery>,
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let page = parse_page(params.page.as_deref());
    let sort = SortField::parse_lenient(params.sort_by.as_deref());
    let order = SortOrder::parse_lenient(params.order.as_deref());

    let result = state
        .repo
        .query_page(sort, order, page, ENTRIES_PER_PAGE)
        .await?;

    Ok(Json(LeaderboardResponse {
        entries: result.entries.into_iter().map(LeaderboardRow::from).collect(),
        total_pages: result.total_pages,
        current_page: result.current_page,
    }))
}

/// Missing, unparseable or non-positive pages mean page 1.
fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}
