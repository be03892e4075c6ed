//! Activity feed reads
//!
//! Cursor-based incremental reader over the milestone stream. The cursor is
//! the `created_at` of the most recently seen item; with a cursor only
//! strictly newer items are returned, in ascending order, so clients can
//! prepend and keep a bounded local buffer.

use onair_common::api::Milestone;
use onair_common::db::models::MilestoneRow;
use onair_common::Result;
use sqlx::SqlitePool;
use tracing::warn;

/// Default and maximum feed page sizes
pub const DEFAULT_FEED_LIMIT: i64 = 20;
pub const MAX_FEED_LIMIT: i64 = 100;

/// Read the feed.
///
/// Without `since`: the newest `limit` milestones, newest first.
/// With `since` (unix ms): milestones strictly newer, oldest first.
pub async fn activity(
    db: &SqlitePool,
    since: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<Milestone>> {
    let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT);

    let rows: Vec<MilestoneRow> = match since {
        Some(cursor) => {
            sqlx::query_as(
                "SELECT id, identity_key, kind, subject, value, metadata, created_at
                 FROM milestones
                 WHERE created_at > ?
                 ORDER BY created_at ASC, rowid ASC
                 LIMIT ?",
            )
            .bind(cursor)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT id, identity_key, kind, subject, value, metadata, created_at
                 FROM milestones
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?",
            )
            .bind(limit)
            .fetch_all(db)
            .await?
        }
    };

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let kind = row.kind.clone();
            let milestone = Milestone::from_row(row);
            if milestone.is_none() {
                // Unknown kind in storage (newer schema?); skip rather than fail
                warn!("Skipping milestone with unknown kind {:?}", kind);
            }
            milestone
        })
        .collect())
}
