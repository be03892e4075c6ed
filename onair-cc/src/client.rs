//! HTTP client for the engagement server

use onair_common::api::{
    AccrueRequest, AccrueResponse, ActivityResponse, AddLikeRequest, AddLikeResponse,
    ChatMessage, LeaderboardResponse, LikeStateResponse, ListenerProfile, Milestone,
    PostMessageRequest, RegisterRequest, ResolvedIdentity,
};
use reqwest::StatusCode;
use thiserror::Error;

/// Companion client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure; retried on the caller's next scheduled tick
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server rejected the request
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Thin typed wrapper over the engagement server's REST API
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// GET /api/likes
    pub async fn like_state(
        &self,
        track: &str,
        artist: &str,
        identity_key: &str,
    ) -> ClientResult<LikeStateResponse> {
        let response = self
            .http
            .get(format!("{}/api/likes", self.base_url))
            .query(&[("track", track), ("artist", artist), ("identity_key", identity_key)])
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    /// POST /api/likes
    ///
    /// A 409 is idempotent success from the caller's point of view: the
    /// returned body carries `already_liked` and the unchanged count. No
    /// error banner, no retry.
    pub async fn add_like(
        &self,
        track: &str,
        artist: &str,
        identity_key: &str,
    ) -> ClientResult<AddLikeResponse> {
        let response = self
            .http
            .post(format!("{}/api/likes", self.base_url))
            .json(&AddLikeRequest {
                track: track.to_string(),
                artist: artist.to_string(),
                identity_key: identity_key.to_string(),
            })
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Ok(response.json().await?);
        }
        Self::expect_ok(response).await
    }

    /// GET /api/chat/messages
    pub async fn messages(&self, limit: Option<i64>) -> ClientResult<Vec<ChatMessage>> {
        let mut request = self.http.get(format!("{}/api/chat/messages", self.base_url));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        Self::expect_ok(request.send().await?).await
    }

    /// POST /api/chat/messages
    pub async fn post_message(&self, request: &PostMessageRequest) -> ClientResult<ChatMessage> {
        let response = self
            .http
            .post(format!("{}/api/chat/messages", self.base_url))
            .json(request)
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    /// GET /api/activity
    pub async fn activity(
        &self,
        since: Option<i64>,
        limit: Option<i64>,
    ) -> ClientResult<Vec<Milestone>> {
        let mut request = self.http.get(format!("{}/api/activity", self.base_url));
        if let Some(since) = since {
            request = request.query(&[("since", since)]);
        }
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        let response: ActivityResponse = Self::expect_ok(request.send().await?).await?;
        Ok(response.milestones)
    }

    /// GET /api/leaderboard
    pub async fn leaderboard(&self, limit: Option<i64>) -> ClientResult<LeaderboardResponse> {
        let mut request = self.http.get(format!("{}/api/leaderboard", self.base_url));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        Self::expect_ok(request.send().await?).await
    }

    /// GET /api/identity for a guest fingerprint
    pub async fn guest_identity(&self, fingerprint: &str) -> ClientResult<ResolvedIdentity> {
        let response = self
            .http
            .get(format!("{}/api/identity", self.base_url))
            .query(&[("fingerprint", fingerprint)])
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    /// GET /api/identity for a registered listener
    pub async fn listener_identity(&self, listener_id: &str) -> ClientResult<ResolvedIdentity> {
        let response = self
            .http
            .get(format!("{}/api/identity", self.base_url))
            .query(&[("listener_id", listener_id)])
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    /// POST /api/listeners
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<ListenerProfile> {
        let response = self
            .http
            .post(format!("{}/api/listeners", self.base_url))
            .json(request)
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    /// POST /api/listeners/accrue
    pub async fn accrue(&self, listener_id: &str, seconds: i64) -> ClientResult<AccrueResponse> {
        let response = self
            .http
            .post(format!("{}/api/listeners/accrue", self.base_url))
            .json(&AccrueRequest {
                listener_id: listener_id.to_string(),
                seconds,
            })
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn expect_ok<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| status.to_string());

        Err(ClientError::Api { status, message })
    }
}
