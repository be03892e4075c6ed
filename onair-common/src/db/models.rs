//! Row models for the engagement tables
//!
//! Ids are stored as hyphenated uuid TEXT; timestamps as unix epoch
//! milliseconds (see `crate::time`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registered listener profile.
///
/// Created at sign-up, mutated by accrual and profile edits, never deleted
/// (soft-retired via the `retired` flag at most).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Listener {
    pub id: String,
    /// Auth-provider subject id
    pub user_id: String,
    /// Account email, used only for artist-badge classification
    pub email: Option<String>,
    pub nickname: String,
    pub avatar_ref: Option<String>,
    pub total_listen_seconds: i64,
    pub retired: bool,
    pub created_at: i64,
}

/// Durable chat entry. Exactly one of `listener_id` or `guest_fingerprint`
/// is set (enforced by a table CHECK constraint and validated before insert).
#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageRow {
    pub id: String,
    pub listener_id: Option<String>,
    pub guest_fingerprint: Option<String>,
    pub guest_display_name: Option<String>,
    pub body: String,
    pub is_reaction: bool,
    pub created_at: i64,
}

/// Insert-only like fact. Uniqueness over (track_name, artist_name,
/// identity_key) is the table's primary key.
#[derive(Debug, Clone, FromRow)]
pub struct TrackLike {
    pub track_name: String,
    pub artist_name: String,
    pub identity_key: String,
    pub created_at: i64,
}

/// Append-only milestone row, the single source for the activity feed.
///
/// `identity_key` is '' for system-wide events; `subject` carries the track
/// key for track milestones; `value` the threshold. The UNIQUE index over
/// (identity_key, kind, subject, value) is the exactly-once guard.
#[derive(Debug, Clone, FromRow)]
pub struct MilestoneRow {
    pub id: String,
    pub identity_key: String,
    pub kind: String,
    pub subject: String,
    pub value: i64,
    pub metadata: String,
    pub created_at: i64,
}
