//! Listener registration and accrual endpoints

use crate::api::ApiError;
use crate::listeners;
use crate::AppState;
use axum::{extract::State, Json};
use onair_common::api::{AccrueRequest, AccrueResponse, ListenerProfile, RegisterRequest};

/// POST /api/listeners
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ListenerProfile>, ApiError> {
    let listener = listeners::register(&state.db, &state.broadcaster, &request).await?;
    Ok(Json(ListenerProfile {
        id: listener.id,
        nickname: listener.nickname,
        avatar_ref: listener.avatar_ref,
        total_listen_seconds: listener.total_listen_seconds,
    }))
}

/// POST /api/listeners/accrue
pub async fn accrue(
    State(state): State<AppState>,
    Json(request): Json<AccrueRequest>,
) -> Result<Json<AccrueResponse>, ApiError> {
    let total = listeners::accrue(
        &state.db,
        &state.broadcaster,
        &request.listener_id,
        request.seconds,
    )
    .await?;
    Ok(Json(AccrueResponse {
        total_listen_seconds: total,
    }))
}
