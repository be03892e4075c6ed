//! Chat channel
//!
//! Accepts, persists and fans out text messages and ephemeral reactions.
//! Validation and the durable insert are the primary action; SSE broadcast
//! is best-effort. Reactions are broadcast like messages but excluded from
//! the durable message list.

use crate::sse::SseBroadcaster;
use onair_common::api::{ChatMessage, PostMessageRequest};
use onair_common::db::models::ChatMessageRow;
use onair_common::events::EngagementEvent;
use onair_common::identity::derive_guest_name;
use onair_common::time::now_ms;
use onair_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Maximum accepted message length in characters (after trimming)
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// Default and maximum page sizes for the message list
pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 200;

/// Validate, persist and broadcast a chat entry.
///
/// The author must be exactly one of a registered listener or a guest
/// fingerprint; the table CHECK constraint backs up this validation.
pub async fn post_message(
    db: &SqlitePool,
    broadcaster: &SseBroadcaster,
    request: &PostMessageRequest,
) -> Result<ChatMessage> {
    let body = request.message.trim();
    if body.is_empty() {
        return Err(Error::InvalidInput("Empty message".to_string()));
    }
    if body.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(Error::InvalidInput(format!(
            "Message exceeds {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }

    let (listener_id, guest_fingerprint, guest_display_name, author_name) =
        match (&request.listener_id, &request.fingerprint) {
            (Some(id), None) => {
                let listener = crate::identity::fetch_listener(db, id)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("listener {}", id)))?;
                (Some(listener.id), None, None, listener.nickname)
            }
            (None, Some(fp)) if !fp.trim().is_empty() => {
                let name = derive_guest_name(fp);
                (
                    None,
                    Some(fp.clone()),
                    Some(name.full()),
                    name.full(),
                )
            }
            _ => {
                return Err(Error::InvalidInput(
                    "Author must be exactly one of listener_id or fingerprint".to_string(),
                ))
            }
        };

    let row = ChatMessageRow {
        id: Uuid::new_v4().to_string(),
        listener_id,
        guest_fingerprint,
        guest_display_name,
        body: body.to_string(),
        is_reaction: request.is_reaction,
        created_at: now_ms(),
    };

    sqlx::query(
        "INSERT INTO chat_messages
            (id, listener_id, guest_fingerprint, guest_display_name, body,
             is_reaction, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&row.id)
    .bind(&row.listener_id)
    .bind(&row.guest_fingerprint)
    .bind(&row.guest_display_name)
    .bind(&row.body)
    .bind(row.is_reaction)
    .bind(row.created_at)
    .execute(db)
    .await?;

    let message = ChatMessage::from_row(row, author_name);

    // Fan-out is best-effort; the author's own client will also receive this
    // echo and must deduplicate by id.
    let event = if message.is_reaction {
        EngagementEvent::ReactionPosted {
            message: message.clone(),
        }
    } else {
        EngagementEvent::ChatMessagePosted {
            message: message.clone(),
        }
    };
    broadcaster.broadcast_lossy(event);

    Ok(message)
}

/// Newest `limit` durable messages, returned oldest-to-newest. Reactions are
/// excluded from the durable read model.
pub async fn list_messages(db: &SqlitePool, limit: Option<i64>) -> Result<Vec<ChatMessage>> {
    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

    #[derive(sqlx::FromRow)]
    struct JoinedRow {
        id: String,
        listener_id: Option<String>,
        guest_fingerprint: Option<String>,
        guest_display_name: Option<String>,
        body: String,
        is_reaction: bool,
        created_at: i64,
        nickname: Option<String>,
    }

    let mut rows: Vec<JoinedRow> = sqlx::query_as(
        "SELECT m.id, m.listener_id, m.guest_fingerprint, m.guest_display_name,
                m.body, m.is_reaction, m.created_at, l.nickname
         FROM chat_messages m
         LEFT JOIN listeners l ON l.id = m.listener_id
         WHERE m.is_reaction = 0
         ORDER BY m.created_at DESC, m.rowid DESC
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    // Oldest-to-newest within the returned page
    rows.reverse();

    Ok(rows
        .into_iter()
        .map(|r| {
            let author_name = r
                .nickname
                .or(r.guest_display_name.clone())
                .unwrap_or_else(|| "Listener".to_string());
            ChatMessage::from_row(
                ChatMessageRow {
                    id: r.id,
                    listener_id: r.listener_id,
                    guest_fingerprint: r.guest_fingerprint,
                    guest_display_name: r.guest_display_name,
                    body: r.body,
                    is_reaction: r.is_reaction,
                    created_at: r.created_at,
                },
                author_name,
            )
        })
        .collect())
}
