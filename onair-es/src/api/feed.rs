//! Activity feed endpoint

use crate::api::ApiError;
use crate::feed;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use onair_common::api::ActivityResponse;
use serde::Deserialize;

/// Query parameters for GET /api/activity
#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    /// Cursor: unix ms of the most recently seen item
    pub since: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/activity?since&limit
pub async fn activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let milestones = feed::activity(&state.db, query.since, query.limit).await?;
    Ok(Json(ActivityResponse { milestones }))
}
