//! API request/response types shared between the engagement server and the
//! companion client.

use crate::db::models::{ChatMessageRow, MilestoneRow};
use serde::{Deserialize, Serialize};

/// Closed set of milestone kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    ListeningHours,
    FirstSignup,
    TrackLiked,
    TrackFirstLike,
    TrackMilestoneLikes,
    TrackRankOne,
    TotalListeners,
}

impl MilestoneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneKind::ListeningHours => "listening_hours",
            MilestoneKind::FirstSignup => "first_signup",
            MilestoneKind::TrackLiked => "track_liked",
            MilestoneKind::TrackFirstLike => "track_first_like",
            MilestoneKind::TrackMilestoneLikes => "track_milestone_likes",
            MilestoneKind::TrackRankOne => "track_rank_one",
            MilestoneKind::TotalListeners => "total_listeners",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "listening_hours" => Some(MilestoneKind::ListeningHours),
            "first_signup" => Some(MilestoneKind::FirstSignup),
            "track_liked" => Some(MilestoneKind::TrackLiked),
            "track_first_like" => Some(MilestoneKind::TrackFirstLike),
            "track_milestone_likes" => Some(MilestoneKind::TrackMilestoneLikes),
            "track_rank_one" => Some(MilestoneKind::TrackRankOne),
            "total_listeners" => Some(MilestoneKind::TotalListeners),
            _ => None,
        }
    }
}

/// Wire form of a chat message as returned by the API and carried over SSE
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    /// Nickname for registered authors, derived guest name otherwise
    pub author_name: String,
    /// Set for registered authors only
    pub listener_id: Option<String>,
    pub is_guest: bool,
    pub body: String,
    pub is_reaction: bool,
    pub created_at: i64,
}

impl ChatMessage {
    /// Build the wire form from a row plus the author's resolved display name
    pub fn from_row(row: ChatMessageRow, author_name: String) -> Self {
        Self {
            id: row.id,
            author_name,
            is_guest: row.listener_id.is_none(),
            listener_id: row.listener_id,
            body: row.body,
            is_reaction: row.is_reaction,
            created_at: row.created_at,
        }
    }
}

/// Wire form of a milestone for the activity feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub id: String,
    pub kind: MilestoneKind,
    /// None for system-wide events (e.g. a track crossing a like threshold)
    pub identity_key: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: i64,
}

impl Milestone {
    pub fn from_row(row: MilestoneRow) -> Option<Self> {
        let kind = MilestoneKind::from_str(&row.kind)?;
        let metadata =
            serde_json::from_str(&row.metadata).unwrap_or(serde_json::Value::Null);
        Some(Self {
            id: row.id,
            kind,
            identity_key: if row.identity_key.is_empty() {
                None
            } else {
                Some(row.identity_key)
            },
            metadata,
            created_at: row.created_at,
        })
    }
}

/// GET /api/likes response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeStateResponse {
    pub likes: i64,
    pub user_liked: bool,
}

/// POST /api/likes request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLikeRequest {
    pub track: String,
    pub artist: String,
    pub identity_key: String,
}

/// POST /api/likes response (200 on insert, 409 with already_liked on dup)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLikeResponse {
    pub success: bool,
    #[serde(default)]
    pub already_liked: bool,
    pub likes: i64,
}

/// POST /api/chat/messages request. Exactly one of `listener_id` or
/// `fingerprint` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMessageRequest {
    pub listener_id: Option<String>,
    pub fingerprint: Option<String>,
    pub message: String,
    #[serde(default)]
    pub is_reaction: bool,
}

/// GET /api/activity response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub milestones: Vec<Milestone>,
}

/// One leaderboard row; rank is the 1-based position in the sorted order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub listener_id: String,
    pub nickname: String,
    pub avatar_ref: Option<String>,
    pub total_listen_seconds: i64,
}

/// GET /api/leaderboard response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}

/// GET /api/identity response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub is_artist: bool,
    pub is_admin: bool,
    /// Like-ledger key: listener id if registered, guest fingerprint otherwise
    pub identity_key: String,
}

/// POST /api/listeners request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub user_id: String,
    pub email: Option<String>,
    pub nickname: String,
    pub avatar_ref: Option<String>,
}

/// Public listener profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerProfile {
    pub id: String,
    pub nickname: String,
    pub avatar_ref: Option<String>,
    pub total_listen_seconds: i64,
}

/// POST /api/listeners/accrue request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrueRequest {
    pub listener_id: String,
    pub seconds: i64,
}

/// POST /api/listeners/accrue response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrueResponse {
    pub total_listen_seconds: i64,
}

/// GET /health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}
