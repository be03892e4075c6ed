//! Track-like ledger
//!
//! Records at-most-one like per (track, artist, identity) and exposes the
//! current counts. The composite primary key on `track_likes` is the only
//! cross-request invariant; a duplicate insert degrades to an idempotent
//! "already liked" outcome rather than an error.

use crate::milestones;
use crate::AppState;
use onair_common::api::LikeStateResponse;
use onair_common::time::now_ms;
use onair_common::{Error, Result};
use sqlx::SqlitePool;

/// Outcome of a like submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddLikeOutcome {
    /// Fresh insert; `likes` is the read-after-write count
    Inserted { likes: i64 },
    /// The (track, artist, identity) combination already existed
    AlreadyLiked { likes: i64 },
}

/// Current like state for a track as seen by one identity.
///
/// The total count may be served from the short-TTL cache; whether the
/// caller liked it is always a direct read (it drives the UI's button state
/// and must not flap with cache expiry).
pub async fn like_state(
    state: &AppState,
    track: &str,
    artist: &str,
    identity_key: &str,
) -> Result<LikeStateResponse> {
    validate_subject(track, artist)?;

    let cache_key = (track.to_string(), artist.to_string());
    let likes = match state.like_cache.get(&cache_key) {
        Some(count) => count,
        None => {
            let count = count_likes(&state.db, track, artist).await?;
            state.like_cache.put(cache_key, count);
            count
        }
    };

    let user_liked = has_liked(&state.db, track, artist, identity_key).await?;

    Ok(LikeStateResponse { likes, user_liked })
}

/// Submit a like. On a fresh insert the post-insert count is read back in
/// the same request and handed to the milestone engine; the cache is never
/// consulted on this path.
pub async fn add_like(
    state: &AppState,
    track: &str,
    artist: &str,
    identity_key: &str,
) -> Result<AddLikeOutcome> {
    validate_subject(track, artist)?;
    if identity_key.trim().is_empty() {
        return Err(Error::InvalidInput("Missing identity_key".to_string()));
    }

    let result = sqlx::query(
        "INSERT OR IGNORE INTO track_likes (track_name, artist_name, identity_key, created_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(track)
    .bind(artist)
    .bind(identity_key)
    .bind(now_ms())
    .execute(&state.db)
    .await?;

    // Read-after-write: the count must reflect the just-inserted row before
    // the milestone engine sees it.
    let likes = count_likes(&state.db, track, artist).await?;

    if result.rows_affected() == 0 {
        return Ok(AddLikeOutcome::AlreadyLiked { likes });
    }

    // Refresh the read cache with the authoritative count
    state
        .like_cache
        .put((track.to_string(), artist.to_string()), likes);

    milestones::on_track_like(
        &state.db,
        &state.broadcaster,
        track,
        artist,
        identity_key,
        likes,
    )
    .await;

    Ok(AddLikeOutcome::Inserted { likes })
}

async fn count_likes(db: &SqlitePool, track: &str, artist: &str) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM track_likes WHERE track_name = ? AND artist_name = ?",
    )
    .bind(track)
    .bind(artist)
    .fetch_one(db)
    .await?;
    Ok(count)
}

async fn has_liked(
    db: &SqlitePool,
    track: &str,
    artist: &str,
    identity_key: &str,
) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM track_likes
         WHERE track_name = ? AND artist_name = ? AND identity_key = ?",
    )
    .bind(track)
    .bind(artist)
    .bind(identity_key)
    .fetch_optional(db)
    .await?;
    Ok(row.is_some())
}

fn validate_subject(track: &str, artist: &str) -> Result<()> {
    if track.trim().is_empty() || artist.trim().is_empty() {
        return Err(Error::InvalidInput(
            "track and artist must be non-empty".to_string(),
        ));
    }
    Ok(())
}
