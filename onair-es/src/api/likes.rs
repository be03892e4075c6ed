//! Track-like endpoints

use crate::api::ApiError;
use crate::likes::{self, AddLikeOutcome};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use onair_common::api::{AddLikeRequest, AddLikeResponse, LikeStateResponse};
use serde::Deserialize;

/// Query parameters for GET /api/likes
#[derive(Debug, Deserialize)]
pub struct LikeStateQuery {
    pub track: String,
    pub artist: String,
    pub identity_key: String,
}

/// GET /api/likes?track&artist&identity_key
pub async fn like_state(
    State(state): State<AppState>,
    Query(query): Query<LikeStateQuery>,
) -> Result<Json<LikeStateResponse>, ApiError> {
    let response =
        likes::like_state(&state, &query.track, &query.artist, &query.identity_key).await?;
    Ok(Json(response))
}

/// POST /api/likes
///
/// 200 with the fresh count on insert; 409 with `already_liked` when the
/// identity had already liked the track (idempotent success client-side).
pub async fn add_like(
    State(state): State<AppState>,
    Json(request): Json<AddLikeRequest>,
) -> Result<Response, ApiError> {
    let outcome =
        likes::add_like(&state, &request.track, &request.artist, &request.identity_key).await?;

    let response = match outcome {
        AddLikeOutcome::Inserted { likes } => (
            StatusCode::OK,
            Json(AddLikeResponse {
                success: true,
                already_liked: false,
                likes,
            }),
        ),
        AddLikeOutcome::AlreadyLiked { likes } => (
            StatusCode::CONFLICT,
            Json(AddLikeResponse {
                success: false,
                already_liked: true,
                likes,
            }),
        ),
    };

    Ok(response.into_response())
}
