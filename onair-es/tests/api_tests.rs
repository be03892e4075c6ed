//! Integration tests for onair-es API endpoints
//!
//! Exercises the built router against an in-memory database:
//! - Like ledger idempotency and threshold milestones
//! - Chat validation and listing
//! - Activity feed cursor behavior
//! - Leaderboard ordering
//! - Listener registration and accrual milestones

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

use onair_common::db::init_memory_database;
use onair_es::{build_router, AppState};

/// Test helper: build the app over a fresh in-memory database
async fn setup_app() -> axum::Router {
    let pool = init_memory_database().await.expect("memory db");
    build_router(AppState::new(pool))
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Register a listener and return its id
async fn register_listener(app: &axum::Router, user_id: &str, nickname: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/listeners",
            json!({ "user_id": user_id, "nickname": nickname, "email": null, "avatar_ref": null }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    body["id"].as_str().unwrap().to_string()
}

/// Milestones of one kind currently in the feed
async fn feed_milestones_of_kind(app: &axum::Router, kind: &str) -> Vec<Value> {
    let response = app
        .clone()
        .oneshot(get_request("/api/activity?limit=100"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    body["milestones"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["kind"] == kind)
        .cloned()
        .collect()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "onair-es");
    assert!(body["version"].is_string());
}

// =============================================================================
// Like ledger
// =============================================================================

#[tokio::test]
async fn test_like_then_duplicate_is_conflict() {
    let app = setup_app().await;

    let first = app
        .clone()
        .oneshot(post_json(
            "/api/likes",
            json!({ "track": "Night Drive", "artist": "The Statics", "identity_key": "fp-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let body = extract_json(first.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["likes"], 1);

    let second = app
        .clone()
        .oneshot(post_json(
            "/api/likes",
            json!({ "track": "Night Drive", "artist": "The Statics", "identity_key": "fp-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = extract_json(second.into_body()).await;
    assert_eq!(body["already_liked"], true);
    assert_eq!(body["likes"], 1, "count unchanged after duplicate");

    let state = app
        .clone()
        .oneshot(get_request(
            "/api/likes?track=Night%20Drive&artist=The%20Statics&identity_key=fp-1",
        ))
        .await
        .unwrap();
    assert_eq!(state.status(), StatusCode::OK);
    let body = extract_json(state.into_body()).await;
    assert_eq!(body["likes"], 1);
    assert_eq!(body["user_liked"], true);
}

#[tokio::test]
async fn test_five_likes_emit_one_threshold_milestone() {
    let app = setup_app().await;

    for i in 0..5 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/likes",
                json!({ "track": "Song", "artist": "Band", "identity_key": format!("fp-{}", i) }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let milestones = feed_milestones_of_kind(&app, "track_milestone_likes").await;
    assert_eq!(milestones.len(), 1);
    assert_eq!(milestones[0]["metadata"]["like_count"], 5);
    assert_eq!(milestones[0]["metadata"]["track_name"], "Song");

    // A 6th like emits no further threshold milestone (next mark is 10)
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/likes",
            json!({ "track": "Song", "artist": "Band", "identity_key": "fp-5" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let milestones = feed_milestones_of_kind(&app, "track_milestone_likes").await;
    assert_eq!(milestones.len(), 1);
}

#[tokio::test]
async fn test_registered_first_like_attribution() {
    let app = setup_app().await;
    let listener_id = register_listener(&app, "auth0|ana", "Ana").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/likes",
            json!({ "track": "Song", "artist": "Band", "identity_key": listener_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let first_likes = feed_milestones_of_kind(&app, "track_first_like").await;
    assert_eq!(first_likes.len(), 1);
    assert_eq!(first_likes[0]["metadata"]["nickname"], "Ana");
    assert_eq!(first_likes[0]["identity_key"], listener_id.as_str());

    let liked = feed_milestones_of_kind(&app, "track_liked").await;
    assert_eq!(liked.len(), 1);
}

#[tokio::test]
async fn test_guest_first_like_is_suppressed() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/likes",
            json!({ "track": "Song", "artist": "Band", "identity_key": "fp-guest" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(feed_milestones_of_kind(&app, "track_first_like").await.is_empty());
    assert!(feed_milestones_of_kind(&app, "track_liked").await.is_empty());
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_guest_chat_post_and_list() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat/messages",
            json!({ "fingerprint": "fp-1", "message": "hello radio", "is_reaction": false }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let posted = extract_json(response.into_body()).await;
    assert_eq!(posted["body"], "hello radio");
    assert_eq!(posted["is_guest"], true);

    let list = app
        .clone()
        .oneshot(get_request("/api/chat/messages?limit=10"))
        .await
        .unwrap();
    assert_eq!(list.status(), StatusCode::OK);
    let messages = extract_json(list.into_body()).await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["id"], posted["id"]);
}

#[tokio::test]
async fn test_chat_validation_errors() {
    let app = setup_app().await;

    // Empty body
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat/messages",
            json!({ "fingerprint": "fp-1", "message": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing identity
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat/messages",
            json!({ "message": "hi" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown listener
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat/messages",
            json!({ "listener_id": "missing", "message": "hi" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Activity feed
// =============================================================================

#[tokio::test]
async fn test_activity_cursor_round_trip() {
    let app = setup_app().await;
    let listener_id = register_listener(&app, "auth0|ana", "Ana").await;

    // Two milestone-producing actions
    app.clone()
        .oneshot(post_json(
            "/api/listeners/accrue",
            json!({ "listener_id": listener_id, "seconds": 3600 }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/api/activity"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let milestones = body["milestones"].as_array().unwrap();
    assert!(!milestones.is_empty());

    // Newest first without a cursor
    let timestamps: Vec<i64> = milestones
        .iter()
        .map(|m| m["created_at"].as_i64().unwrap())
        .collect();
    for pair in timestamps.windows(2) {
        assert!(pair[0] >= pair[1]);
    }

    // Strictly-newer cursor read yields nothing after the newest item
    let newest = timestamps[0];
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/activity?since={}", newest)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["milestones"].as_array().unwrap().is_empty());
}

// =============================================================================
// Leaderboard
// =============================================================================

#[tokio::test]
async fn test_leaderboard_orders_by_listening_time() {
    let app = setup_app().await;
    let ana = register_listener(&app, "auth0|ana", "Ana").await;
    let ben = register_listener(&app, "auth0|ben", "Ben").await;

    app.clone()
        .oneshot(post_json(
            "/api/listeners/accrue",
            json!({ "listener_id": ana, "seconds": 1200 }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_json(
            "/api/listeners/accrue",
            json!({ "listener_id": ben, "seconds": 2400 }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/api/leaderboard?limit=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["nickname"], "Ben");
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[1]["nickname"], "Ana");
    assert_eq!(entries[1]["rank"], 2);
}

// =============================================================================
// Listeners
// =============================================================================

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = setup_app().await;
    register_listener(&app, "auth0|ana", "Ana").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/listeners",
            json!({ "user_id": "auth0|ana", "nickname": "Imposter" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_accrual_crossing_emits_single_hour_milestone() {
    let app = setup_app().await;
    let listener_id = register_listener(&app, "auth0|ana", "Ana").await;

    // 9.9 hours first
    app.clone()
        .oneshot(post_json(
            "/api/listeners/accrue",
            json!({ "listener_id": listener_id, "seconds": 35_640 }),
        ))
        .await
        .unwrap();

    let before = feed_milestones_of_kind(&app, "listening_hours").await;
    assert_eq!(before.len(), 2); // 1h and 5h marks

    // 9.9 -> 10.1 hours in one update
    app.clone()
        .oneshot(post_json(
            "/api/listeners/accrue",
            json!({ "listener_id": listener_id, "seconds": 720 }),
        ))
        .await
        .unwrap();

    let after = feed_milestones_of_kind(&app, "listening_hours").await;
    assert_eq!(after.len(), 3);
    let hours: Vec<i64> = after
        .iter()
        .map(|m| m["metadata"]["hours"].as_i64().unwrap())
        .collect();
    assert!(hours.contains(&10));
}

// =============================================================================
// Identity
// =============================================================================

#[tokio::test]
async fn test_identity_resolution_for_guest_is_stable() {
    let app = setup_app().await;

    let first = app
        .clone()
        .oneshot(get_request("/api/identity?fingerprint=fp-abc"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = extract_json(first.into_body()).await;

    let second = app
        .clone()
        .oneshot(get_request("/api/identity?fingerprint=fp-abc"))
        .await
        .unwrap();
    let second = extract_json(second.into_body()).await;

    assert_eq!(first["display_name"], second["display_name"]);
    assert_eq!(first["identity_key"], "fp-abc");
    assert_eq!(first["is_artist"], false);
    assert_eq!(first["is_admin"], false);
}
