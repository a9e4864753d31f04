//! Database initialization
//!
//! Opens (or creates) the target database and creates the five tables if
//! they do not exist yet. The pool is capped at one connection: the batch
//! job is strictly sequential over a single session, and every operation
//! takes that session explicitly.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Single connection: one session, one transaction at a time
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    create_songs_table(&pool).await?;
    create_artists_table(&pool).await?;
    create_time_table(&pool).await?;
    create_users_table(&pool).await?;
    create_songplays_table(&pool).await?;

    Ok(pool)
}

/// Create the songs table
///
/// song_id is supplied by the source documents, never generated.
pub async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            song_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            artist_id TEXT NOT NULL,
            year INTEGER NOT NULL,
            duration REAL NOT NULL,
            CHECK (duration > 0.0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Equality lookup for songplay resolution runs on (title, duration),
    // joined against artists on name
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_lookup ON songs(title, duration)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the artists table
pub async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            artist_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            location TEXT,
            latitude REAL,
            longitude REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_artists_name ON artists(name)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the time dimension table
///
/// start_time is the event's epoch-millisecond timestamp, kept verbatim.
pub async fn create_time_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS time (
            start_time INTEGER PRIMARY KEY,
            hour INTEGER NOT NULL,
            day INTEGER NOT NULL,
            week INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            weekday TEXT NOT NULL,
            CHECK (hour >= 0 AND hour < 24),
            CHECK (day >= 1 AND day <= 31),
            CHECK (week >= 1 AND week <= 53),
            CHECK (month >= 1 AND month <= 12)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the users table
pub async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            gender TEXT NOT NULL,
            level TEXT NOT NULL CHECK (level IN ('free', 'paid'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the songplays fact table
///
/// song_id and artist_id are nullable: a play whose song/artist lookup
/// finds no unique match is still recorded.
pub async fn create_songplays_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songplays (
            songplay_id INTEGER PRIMARY KEY AUTOINCREMENT,
            start_time INTEGER NOT NULL REFERENCES time(start_time),
            user_id INTEGER NOT NULL REFERENCES users(user_id),
            level TEXT NOT NULL,
            song_id TEXT REFERENCES songs(song_id),
            artist_id TEXT REFERENCES artists(artist_id),
            session_id INTEGER NOT NULL,
            location TEXT NOT NULL,
            user_agent TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songplays_start_time ON songplays(start_time)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songplays_user ON songplays(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}
