//! Identity resolution
//!
//! Both identity classes flow through the same resolution path: a registered
//! listener is looked up by id, a guest's display identity is derived from
//! the client-held fingerprint with no storage. Role classification reads
//! the role store and fails safe: a lookup error logs a warning and yields
//! `false` rather than failing the caller's primary action.

use onair_common::api::ResolvedIdentity;
use onair_common::db::models::Listener;
use onair_common::identity::derive_guest_name;
use onair_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::warn;

/// Resolve a display identity from either a listener id or a fingerprint.
///
/// Exactly one of the two must be supplied.
pub async fn resolve(
    db: &SqlitePool,
    listener_id: Option<&str>,
    fingerprint: Option<&str>,
) -> Result<ResolvedIdentity> {
    match (listener_id, fingerprint) {
        (Some(id), None) => {
            let listener = fetch_listener(db, id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("listener {}", id)))?;
            Ok(resolve_registered(db, &listener).await)
        }
        (None, Some(fp)) => {
            if fp.trim().is_empty() {
                return Err(Error::InvalidInput("Empty fingerprint".to_string()));
            }
            Ok(resolve_guest(fp))
        }
        _ => Err(Error::InvalidInput(
            "Supply exactly one of listener_id or fingerprint".to_string(),
        )),
    }
}

/// Resolve a registered listener's display identity and roles
pub async fn resolve_registered(db: &SqlitePool, listener: &Listener) -> ResolvedIdentity {
    let is_artist = match &listener.email {
        Some(email) => is_approved_artist(db, email).await,
        None => false,
    };
    let is_admin = is_admin_user(db, &listener.user_id).await;

    ResolvedIdentity {
        display_name: listener.nickname.clone(),
        avatar_ref: listener.avatar_ref.clone(),
        is_artist,
        is_admin,
        identity_key: listener.id.clone(),
    }
}

/// Derive a guest's display identity (pure, no storage)
pub fn resolve_guest(fingerprint: &str) -> ResolvedIdentity {
    let name = derive_guest_name(fingerprint);
    ResolvedIdentity {
        display_name: name.full(),
        avatar_ref: None,
        is_artist: false,
        is_admin: false,
        identity_key: fingerprint.to_string(),
    }
}

/// Fetch a listener row by id
pub async fn fetch_listener(db: &SqlitePool, id: &str) -> Result<Option<Listener>> {
    let listener = sqlx::query_as::<_, Listener>(
        "SELECT id, user_id, email, nickname, avatar_ref, total_listen_seconds,
                retired, created_at
         FROM listeners WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(listener)
}

/// Artist badge lookup. Read-only and fail-safe: role absence on error.
async fn is_approved_artist(db: &SqlitePool, email: &str) -> bool {
    let result: std::result::Result<Option<(String,)>, sqlx::Error> =
        sqlx::query_as("SELECT email FROM approved_artists WHERE email = ?")
            .bind(email)
            .fetch_optional(db)
            .await;

    match result {
        Ok(row) => row.is_some(),
        Err(e) => {
            warn!("Artist role lookup failed (defaulting to false): {}", e);
            false
        }
    }
}

/// Admin lookup. Read-only and fail-safe: role absence on error.
async fn is_admin_user(db: &SqlitePool, user_id: &str) -> bool {
    let result: std::result::Result<Option<(String,)>, sqlx::Error> =
        sqlx::query_as("SELECT user_id FROM admin_users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(db)
            .await;

    match result {
        Ok(row) => row.is_some(),
        Err(e) => {
            warn!("Admin role lookup failed (defaulting to false): {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onair_common::db::init_memory_database;

    #[tokio::test]
    async fn test_guest_resolution_is_pure() {
        let a = resolve_guest("fp-abc");
        let b = resolve_guest("fp-abc");
        assert_eq!(a.display_name, b.display_name);
        assert_eq!(a.identity_key, "fp-abc");
        assert!(!a.is_artist);
        assert!(!a.is_admin);
    }

    #[tokio::test]
    async fn test_resolve_requires_exactly_one_identity() {
        let pool = init_memory_database().await.unwrap();

        assert!(resolve(&pool, None, None).await.is_err());
        assert!(resolve(&pool, Some("l-1"), Some("fp-1")).await.is_err());
    }

    #[tokio::test]
    async fn test_registered_roles_from_store() {
        let pool = init_memory_database().await.unwrap();

        sqlx::query(
            "INSERT INTO listeners (id, user_id, email, nickname, created_at)
             VALUES ('l-1', 'auth0|1', 'artist@example.com', 'DJ Nova', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO approved_artists (email) VALUES ('artist@example.com')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO admin_users (user_id) VALUES ('auth0|1')")
            .execute(&pool)
            .await
            .unwrap();

        let identity = resolve(&pool, Some("l-1"), None).await.unwrap();
        assert_eq!(identity.display_name, "DJ Nova");
        assert!(identity.is_artist);
        assert!(identity.is_admin);
        assert_eq!(identity.identity_key, "l-1");
    }

    #[tokio::test]
    async fn test_unknown_listener_is_not_found() {
        let pool = init_memory_database().await.unwrap();
        let result = resolve(&pool, Some("missing"), None).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
