//! Database initialization
//!
//! Creates the engagement schema on first run and is idempotent on every
//! subsequent startup. The unique indexes created here are the only
//! cross-request invariants the services rely on; everything above them is
//! stateless request handling.

use crate::config::RoleSeeds;
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = init_database_url(&db_url).await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    Ok(pool)
}

/// Initialize a pool against an explicit SQLite URL and apply the schema
pub async fn init_database_url(db_url: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(db_url)
        .await?;

    apply_pragmas(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database for tests. Pinned to a single connection so the
/// schema survives across statements.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    apply_pragmas(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

async fn apply_pragmas(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer; like submissions and
    // feed polls overlap constantly.
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Run all table creations (idempotent - safe to call multiple times)
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_listeners_table(pool).await?;
    create_chat_messages_table(pool).await?;
    create_track_likes_table(pool).await?;
    create_milestones_table(pool).await?;
    create_role_tables(pool).await?;
    Ok(())
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES ('schema_version', '1')")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_listeners_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS listeners (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            email TEXT,
            nickname TEXT NOT NULL,
            avatar_ref TEXT,
            total_listen_seconds INTEGER NOT NULL DEFAULT 0,
            retired INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_chat_messages_table(pool: &SqlitePool) -> Result<()> {
    // Author is exactly one of registered listener or guest fingerprint
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS chat_messages (
            id TEXT PRIMARY KEY,
            listener_id TEXT REFERENCES listeners(id),
            guest_fingerprint TEXT,
            guest_display_name TEXT,
            body TEXT NOT NULL,
            is_reaction INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            CHECK (
                (listener_id IS NOT NULL AND guest_fingerprint IS NULL)
                OR (listener_id IS NULL AND guest_fingerprint IS NOT NULL)
            )
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_chat_messages_created_at
         ON chat_messages (created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_track_likes_table(pool: &SqlitePool) -> Result<()> {
    // The composite primary key is the at-most-one-like-per-identity guard
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS track_likes (
            track_name TEXT NOT NULL,
            artist_name TEXT NOT NULL,
            identity_key TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            PRIMARY KEY (track_name, artist_name, identity_key)
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_milestones_table(pool: &SqlitePool) -> Result<()> {
    // UNIQUE (identity_key, kind, subject, value) makes emission exactly-once:
    // a second attempt for the same threshold is INSERT OR IGNORE'd away.
    // identity_key is '' (not NULL) for system-wide events because SQLite
    // treats NULLs as distinct in unique indexes.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS milestones (
            id TEXT PRIMARY KEY,
            identity_key TEXT NOT NULL DEFAULT '',
            kind TEXT NOT NULL,
            subject TEXT NOT NULL DEFAULT '',
            value INTEGER NOT NULL DEFAULT 0,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at INTEGER NOT NULL,
            UNIQUE (identity_key, kind, subject, value)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_milestones_created_at
         ON milestones (created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_role_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS approved_artists (
            email TEXT PRIMARY KEY
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS admin_users (
            user_id TEXT PRIMARY KEY
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Upsert role-store seeds from configuration. Runs on every startup;
/// existing rows are left in place.
pub async fn seed_roles(pool: &SqlitePool, seeds: &RoleSeeds) -> Result<()> {
    for email in &seeds.artist_emails {
        sqlx::query("INSERT OR IGNORE INTO approved_artists (email) VALUES (?)")
            .bind(email)
            .execute(pool)
            .await?;
    }

    for user_id in &seeds.admin_user_ids {
        sqlx::query("INSERT OR IGNORE INTO admin_users (user_id) VALUES (?)")
            .bind(user_id)
            .execute(pool)
            .await?;
    }

    if !seeds.artist_emails.is_empty() || !seeds.admin_user_ids.is_empty() {
        info!(
            "Seeded role store: {} artist emails, {} admin ids",
            seeds.artist_emails.len(),
            seeds.admin_user_ids.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_creation_is_idempotent() {
        let pool = init_memory_database().await.unwrap();
        // Second pass over an existing schema must not fail
        create_schema(&pool).await.unwrap();

        let version: (String,) =
            sqlx::query_as("SELECT value FROM settings WHERE key = 'schema_version'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(version.0, "1");
    }

    #[tokio::test]
    async fn test_chat_author_check_constraint() {
        let pool = init_memory_database().await.unwrap();

        // Neither author field set: rejected by the CHECK constraint
        let result = sqlx::query(
            "INSERT INTO chat_messages (id, body, is_reaction, created_at)
             VALUES ('m1', 'hello', 0, 0)",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());

        // Guest author: accepted
        sqlx::query(
            "INSERT INTO chat_messages
                (id, guest_fingerprint, guest_display_name, body, is_reaction, created_at)
             VALUES ('m2', 'fp-1', 'FoxSwift', 'hello', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_track_like_uniqueness() {
        let pool = init_memory_database().await.unwrap();

        sqlx::query(
            "INSERT INTO track_likes (track_name, artist_name, identity_key, created_at)
             VALUES ('Song', 'Artist', 'fp-1', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let dup = sqlx::query(
            "INSERT INTO track_likes (track_name, artist_name, identity_key, created_at)
             VALUES ('Song', 'Artist', 'fp-1', 1)",
        )
        .execute(&pool)
        .await;
        assert!(dup.is_err(), "duplicate like must violate the primary key");
    }

    #[tokio::test]
    async fn test_seed_roles_idempotent() {
        let pool = init_memory_database().await.unwrap();
        let seeds = RoleSeeds {
            artist_emails: vec!["a@example.com".to_string()],
            admin_user_ids: vec!["auth0|1".to_string()],
        };

        seed_roles(&pool, &seeds).await.unwrap();
        seed_roles(&pool, &seeds).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM approved_artists")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }
}
