//! Listener registration and listening-time accrual
//!
//! The originating events for the signup and listening-hour milestone
//! families. Milestone emission is strictly downstream of the primary write
//! and never affects its outcome.

use crate::milestones;
use crate::sse::SseBroadcaster;
use onair_common::api::RegisterRequest;
use onair_common::db::models::Listener;
use onair_common::time::now_ms;
use onair_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Create a listener profile. Duplicate `user_id` is a conflict.
pub async fn register(
    db: &SqlitePool,
    broadcaster: &SseBroadcaster,
    request: &RegisterRequest,
) -> Result<Listener> {
    let nickname = request.nickname.trim();
    if nickname.is_empty() {
        return Err(Error::InvalidInput("Empty nickname".to_string()));
    }
    if request.user_id.trim().is_empty() {
        return Err(Error::InvalidInput("Empty user_id".to_string()));
    }

    let listener = Listener {
        id: Uuid::new_v4().to_string(),
        user_id: request.user_id.clone(),
        email: request.email.clone(),
        nickname: nickname.to_string(),
        avatar_ref: request.avatar_ref.clone(),
        total_listen_seconds: 0,
        retired: false,
        created_at: now_ms(),
    };

    let result = sqlx::query(
        "INSERT INTO listeners
            (id, user_id, email, nickname, avatar_ref, total_listen_seconds,
             retired, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&listener.id)
    .bind(&listener.user_id)
    .bind(&listener.email)
    .bind(&listener.nickname)
    .bind(&listener.avatar_ref)
    .bind(listener.total_listen_seconds)
    .bind(listener.retired)
    .bind(listener.created_at)
    .execute(db)
    .await;

    match result {
        Ok(_) => {}
        Err(e) => {
            if e.as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false)
            {
                return Err(Error::Conflict(format!(
                    "user_id {} already registered",
                    listener.user_id
                )));
            }
            return Err(e.into());
        }
    }

    milestones::on_signup(db, broadcaster, &listener.id, &listener.nickname).await;

    Ok(listener)
}

/// Add reported listening time to a listener's running total and return the
/// new total. Milestone checks run against the post-update value.
pub async fn accrue(
    db: &SqlitePool,
    broadcaster: &SseBroadcaster,
    listener_id: &str,
    seconds: i64,
) -> Result<i64> {
    if seconds <= 0 {
        return Err(Error::InvalidInput(
            "seconds must be positive".to_string(),
        ));
    }

    let updated = sqlx::query(
        "UPDATE listeners
         SET total_listen_seconds = total_listen_seconds + ?
         WHERE id = ?",
    )
    .bind(seconds)
    .bind(listener_id)
    .execute(db)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(Error::NotFound(format!("listener {}", listener_id)));
    }

    // Read-after-write: milestone thresholds are computed from the total the
    // update just produced, not a cached value.
    let (total, nickname): (i64, String) =
        sqlx::query_as("SELECT total_listen_seconds, nickname FROM listeners WHERE id = ?")
            .bind(listener_id)
            .fetch_one(db)
            .await?;

    milestones::on_accrual(db, broadcaster, listener_id, &nickname, total).await;

    Ok(total)
}
