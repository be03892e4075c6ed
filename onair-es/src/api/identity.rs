//! Identity resolution endpoint

use crate::api::ApiError;
use crate::identity;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use onair_common::api::ResolvedIdentity;
use serde::Deserialize;

/// Query parameters for GET /api/identity (exactly one must be supplied)
#[derive(Debug, Deserialize)]
pub struct IdentityQuery {
    pub listener_id: Option<String>,
    pub fingerprint: Option<String>,
}

/// GET /api/identity?listener_id | ?fingerprint
pub async fn resolve_identity(
    State(state): State<AppState>,
    Query(query): Query<IdentityQuery>,
) -> Result<Json<ResolvedIdentity>, ApiError> {
    let identity = identity::resolve(
        &state.db,
        query.listener_id.as_deref(),
        query.fingerprint.as_deref(),
    )
    .await?;
    Ok(Json(identity))
}
