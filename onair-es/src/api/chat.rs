//! Chat endpoints

use crate::api::ApiError;
use crate::chat;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use onair_common::api::{ChatMessage, PostMessageRequest};
use serde::Deserialize;

/// Query parameters for GET /api/chat/messages
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// GET /api/chat/messages?limit
///
/// Newest `limit` durable messages, oldest first within the page.
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = chat::list_messages(&state.db, query.limit).await?;
    Ok(Json(messages))
}

/// POST /api/chat/messages
pub async fn post_message(
    State(state): State<AppState>,
    Json(request): Json<PostMessageRequest>,
) -> Result<Json<ChatMessage>, ApiError> {
    let message = chat::post_message(&state.db, &state.broadcaster, &request).await?;
    Ok(Json(message))
}
