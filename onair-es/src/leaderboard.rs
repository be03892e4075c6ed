//! Leaderboard view
//!
//! Derived ranking over registered listeners' accumulated listening time.
//! Nothing is persisted: the rank is the 1-based position after sorting by
//! total_listen_seconds descending with listener id ascending as the
//! tie-break, which keeps pagination and ranks stable across requests.

use crate::AppState;
use onair_common::api::LeaderboardEntry;
use onair_common::Result;
use sqlx::SqlitePool;

/// Default and maximum leaderboard sizes
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

/// Top listeners by listening time, freshly computed or served from the
/// short read cache.
pub async fn top_listeners(state: &AppState, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>> {
    let limit = limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);

    if let Some(entries) = state.leaderboard_cache.get(&limit) {
        return Ok(entries);
    }

    let entries = compute_top_listeners(&state.db, limit).await?;
    state.leaderboard_cache.put(limit, entries.clone());
    Ok(entries)
}

/// Uncached ranking query
pub async fn compute_top_listeners(
    db: &SqlitePool,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>> {
    let rows: Vec<(String, String, Option<String>, i64)> = sqlx::query_as(
        "SELECT id, nickname, avatar_ref, total_listen_seconds
         FROM listeners
         WHERE retired = 0
         ORDER BY total_listen_seconds DESC, id ASC
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .enumerate()
        .map(
            |(i, (listener_id, nickname, avatar_ref, total_listen_seconds))| LeaderboardEntry {
                rank: (i + 1) as i64,
                listener_id,
                nickname,
                avatar_ref,
                total_listen_seconds,
            },
        )
        .collect())
}
