//! onair-es library - Listener Engagement Server
//!
//! HTTP API plus SSE fan-out for the real-time listener engagement core:
//! identity resolution, track likes, chat, milestones, activity feed and
//! leaderboard. All request handling is stateless against the shared SQLite
//! store; the only caches are short-lived and read-only.

use onair_common::config::ServiceConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

pub mod api;
pub mod cache;
pub mod chat;
pub mod feed;
pub mod identity;
pub mod leaderboard;
pub mod likes;
pub mod listeners;
pub mod milestones;
pub mod sse;

use cache::TtlCache;
use onair_common::api::LeaderboardEntry;
use sse::SseBroadcaster;

/// How long read-only count caches may serve stale data. Never consulted on
/// the write path.
pub const READ_CACHE_TTL: Duration = Duration::from_secs(30);

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (single source of truth)
    pub db: SqlitePool,
    /// SSE broadcaster for chat and milestone fan-out
    pub broadcaster: SseBroadcaster,
    /// Short-TTL like-count cache keyed by (track, artist)
    pub like_cache: Arc<TtlCache<(String, String), i64>>,
    /// Short-TTL leaderboard cache keyed by requested limit
    pub leaderboard_cache: Arc<TtlCache<i64, Vec<LeaderboardEntry>>>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            broadcaster: SseBroadcaster::new(100),
            like_cache: Arc::new(TtlCache::new(READ_CACHE_TTL)),
            leaderboard_cache: Arc::new(TtlCache::new(READ_CACHE_TTL)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> axum::Router {
    use axum::routing::{get, post};
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    axum::Router::new()
        .route("/health", get(api::health::health_check))
        .route(
            "/api/likes",
            get(api::likes::like_state).post(api::likes::add_like),
        )
        .route(
            "/api/chat/messages",
            get(api::chat::list_messages).post(api::chat::post_message),
        )
        .route("/api/activity", get(api::feed::activity))
        .route("/api/leaderboard", get(api::leaderboard::leaderboard))
        .route("/api/identity", get(api::identity::resolve_identity))
        .route("/api/listeners", post(api::listeners::register))
        .route("/api/listeners/accrue", post(api::listeners::accrue))
        .route("/api/events", get(api::sse::event_stream))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind address from service configuration
pub fn bind_address(config: &ServiceConfig) -> String {
    format!("{}:{}", config.host(), config.port())
}
