//! Leaderboard endpoint

use crate::api::ApiError;
use crate::leaderboard;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use onair_common::api::LeaderboardResponse;
use serde::Deserialize;

/// Query parameters for GET /api/leaderboard
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

/// GET /api/leaderboard?limit
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let entries = leaderboard::top_listeners(&state, query.limit).await?;
    Ok(Json(LeaderboardResponse { entries }))
}
