//! Milestone engine
//!
//! Converts raw state transitions (likes, accrual, signups) into discrete
//! events emitted exactly once. The exactly-once guard is the milestones
//! table's UNIQUE (identity_key, kind, subject, value) index paired with
//! INSERT OR IGNORE: re-crossing a threshold is a no-op at the store.
//!
//! Milestones are a best-effort side channel. Every public entry point here
//! swallows its own errors after logging them; the triggering action (the
//! like, the accrual, the signup) succeeds or fails on its own write alone.

use crate::identity::fetch_listener;
use crate::sse::SseBroadcaster;
use onair_common::api::{Milestone, MilestoneKind};
use onair_common::db::models::MilestoneRow;
use onair_common::events::EngagementEvent;
use onair_common::time::now_ms;
use onair_common::Result;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

/// Listening-hour thresholds (whole hours, floored from total seconds)
pub const LISTENING_HOUR_THRESHOLDS: [i64; 8] = [1, 5, 10, 25, 50, 100, 250, 500];

/// Track like-count thresholds (exact-equality emission rule)
pub const TRACK_LIKE_THRESHOLDS: [i64; 4] = [5, 10, 25, 50];

/// Registered-listener-count marks
pub const TOTAL_LISTENER_THRESHOLDS: [i64; 7] = [10, 25, 50, 100, 250, 500, 1000];

/// Candidate milestone before the uniqueness check
struct NewMilestone {
    /// '' for system-wide events
    identity_key: String,
    kind: MilestoneKind,
    /// Track key for track milestones, '' otherwise
    subject: String,
    /// Threshold value, 0 for single-shot kinds
    value: i64,
    metadata: serde_json::Value,
}

/// Whole hours represented by a listening-seconds total
pub fn listening_hours(total_seconds: i64) -> i64 {
    total_seconds / 3600
}

/// Hour thresholds a listener at `hours` has earned. Emission attempts all
/// of them; the unique index turns previously recorded ones into no-ops, so
/// a single large accrual jump cannot skip an unrecorded mark.
pub fn earned_hour_thresholds(hours: i64) -> Vec<i64> {
    LISTENING_HOUR_THRESHOLDS
        .iter()
        .copied()
        .filter(|t| *t <= hours)
        .collect()
}

/// Stable subject key for a track. Unit separator keeps track/artist names
/// containing any printable character from colliding.
pub fn track_subject(track: &str, artist: &str) -> String {
    format!("{}\u{1f}{}", artist, track)
}

/// Like submission produced a fresh (non-duplicate) insert; `new_count` is
/// the read-after-write count from the same request.
pub async fn on_track_like(
    db: &SqlitePool,
    broadcaster: &SseBroadcaster,
    track: &str,
    artist: &str,
    identity_key: &str,
    new_count: i64,
) {
    let subject = track_subject(track, artist);

    // Attribution events only apply to registered listeners; the feed
    // displays a nickname. A failed lookup degrades to guest treatment.
    let liker = match fetch_listener(db, identity_key).await {
        Ok(listener) => listener,
        Err(e) => {
            warn!("Listener lookup for like attribution failed: {}", e);
            None
        }
    };

    if let Some(listener) = &liker {
        emit(
            db,
            broadcaster,
            NewMilestone {
                identity_key: listener.id.clone(),
                kind: MilestoneKind::TrackLiked,
                subject: subject.clone(),
                value: 0,
                metadata: serde_json::json!({
                    "track_name": track,
                    "artist_name": artist,
                    "nickname": listener.nickname,
                }),
            },
        )
        .await;

        if new_count == 1 {
            emit(
                db,
                broadcaster,
                NewMilestone {
                    identity_key: listener.id.clone(),
                    kind: MilestoneKind::TrackFirstLike,
                    subject: subject.clone(),
                    value: 1,
                    metadata: serde_json::json!({
                        "track_name": track,
                        "artist_name": artist,
                        "nickname": listener.nickname,
                    }),
                },
            )
            .await;
        }
    }

    // Exact-equality rule: a burst of concurrent likes can jump the count
    // past a threshold without landing on it, silently dropping that mark.
    // Accepted limitation of the read-based check.
    if TRACK_LIKE_THRESHOLDS.contains(&new_count) {
        emit(
            db,
            broadcaster,
            NewMilestone {
                identity_key: String::new(),
                kind: MilestoneKind::TrackMilestoneLikes,
                subject: subject.clone(),
                value: new_count,
                metadata: serde_json::json!({
                    "track_name": track,
                    "artist_name": artist,
                    "like_count": new_count,
                }),
            },
        )
        .await;
    }

    check_rank_one(db, broadcaster, track, artist, &subject).await;
}

/// Emit `track_rank_one` the first time a track holds the strictly-highest
/// like count.
async fn check_rank_one(
    db: &SqlitePool,
    broadcaster: &SseBroadcaster,
    track: &str,
    artist: &str,
    subject: &str,
) {
    let top: std::result::Result<Vec<(String, String, i64)>, sqlx::Error> = sqlx::query_as(
        "SELECT track_name, artist_name, COUNT(*) as likes
         FROM track_likes
         GROUP BY track_name, artist_name
         ORDER BY likes DESC
         LIMIT 2",
    )
    .fetch_all(db)
    .await;

    let top = match top {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Rank-one check failed: {}", e);
            return;
        }
    };

    let Some((top_track, top_artist, top_likes)) = top.first() else {
        return;
    };
    if top_track.as_str() != track || top_artist.as_str() != artist {
        return;
    }
    // Strictly highest: a tie at the top is not rank one
    if let Some((_, _, second_likes)) = top.get(1) {
        if second_likes >= top_likes {
            return;
        }
    }

    emit(
        db,
        broadcaster,
        NewMilestone {
            identity_key: String::new(),
            kind: MilestoneKind::TrackRankOne,
            subject: subject.to_string(),
            value: 0,
            metadata: serde_json::json!({
                "track_name": track,
                "artist_name": artist,
                "like_count": top_likes,
            }),
        },
    )
    .await;
}

/// A listener's total listening time changed
pub async fn on_accrual(
    db: &SqlitePool,
    broadcaster: &SseBroadcaster,
    listener_id: &str,
    nickname: &str,
    total_seconds: i64,
) {
    let hours = listening_hours(total_seconds);
    for threshold in earned_hour_thresholds(hours) {
        emit(
            db,
            broadcaster,
            NewMilestone {
                identity_key: listener_id.to_string(),
                kind: MilestoneKind::ListeningHours,
                subject: String::new(),
                value: threshold,
                metadata: serde_json::json!({
                    "hours": threshold,
                    "nickname": nickname,
                }),
            },
        )
        .await;
    }
}

/// A listener account was created
pub async fn on_signup(
    db: &SqlitePool,
    broadcaster: &SseBroadcaster,
    listener_id: &str,
    nickname: &str,
) {
    emit(
        db,
        broadcaster,
        NewMilestone {
            identity_key: listener_id.to_string(),
            kind: MilestoneKind::FirstSignup,
            subject: String::new(),
            value: 0,
            metadata: serde_json::json!({ "nickname": nickname }),
        },
    )
    .await;

    let total: std::result::Result<(i64,), sqlx::Error> =
        sqlx::query_as("SELECT COUNT(*) FROM listeners")
            .fetch_one(db)
            .await;

    let total = match total {
        Ok((count,)) => count,
        Err(e) => {
            warn!("Listener count sampling failed: {}", e);
            return;
        }
    };

    if TOTAL_LISTENER_THRESHOLDS.contains(&total) {
        emit(
            db,
            broadcaster,
            NewMilestone {
                identity_key: String::new(),
                kind: MilestoneKind::TotalListeners,
                subject: String::new(),
                value: total,
                metadata: serde_json::json!({ "total_listeners": total }),
            },
        )
        .await;
    }
}

/// Attempt a single milestone emission. Logs and swallows failures.
async fn emit(db: &SqlitePool, broadcaster: &SseBroadcaster, milestone: NewMilestone) {
    match record(db, &milestone).await {
        Ok(Some(row)) => {
            if let Some(wire) = Milestone::from_row(row) {
                broadcaster.broadcast_lossy(EngagementEvent::MilestoneRecorded {
                    milestone: wire,
                });
            }
        }
        Ok(None) => {
            // Already recorded for this threshold; exactly-once holds
        }
        Err(e) => {
            warn!(
                "Milestone insert failed (kind={}, subject={:?}, value={}): {}",
                milestone.kind.as_str(),
                milestone.subject,
                milestone.value,
                e
            );
        }
    }
}

/// INSERT OR IGNORE against the uniqueness guard. Returns the stored row on
/// a fresh insert, None when the threshold was previously recorded.
async fn record(db: &SqlitePool, milestone: &NewMilestone) -> Result<Option<MilestoneRow>> {
    let row = MilestoneRow {
        id: Uuid::new_v4().to_string(),
        identity_key: milestone.identity_key.clone(),
        kind: milestone.kind.as_str().to_string(),
        subject: milestone.subject.clone(),
        value: milestone.value,
        metadata: milestone.metadata.to_string(),
        created_at: now_ms(),
    };

    let result = sqlx::query(
        "INSERT OR IGNORE INTO milestones
            (id, identity_key, kind, subject, value, metadata, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&row.id)
    .bind(&row.identity_key)
    .bind(&row.kind)
    .bind(&row.subject)
    .bind(row.value)
    .bind(&row.metadata)
    .bind(row.created_at)
    .execute(db)
    .await?;

    if result.rows_affected() == 1 {
        Ok(Some(row))
    } else {
        Ok(None)
    }
}
