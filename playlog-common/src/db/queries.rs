//! Parameterized statement catalog
//!
//! One function per statement, each over an explicit `&mut
//! SqliteConnection` so calls compose inside a per-file transaction.
//!
//! Conflict policy: the dimension tables (songs, artists, time, users) are
//! idempotent on their primary keys; users additionally track the latest
//! subscription level. The songplays fact table issues plain inserts, so a
//! re-run of the batch duplicates songplay rows.

use crate::db::models::{ArtistRecord, SongRecord, SongplayRecord, TimeRecord, UserRecord};
use crate::Result;
use sqlx::SqliteConnection;

pub async fn insert_song(conn: &mut SqliteConnection, rec: &SongRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO songs (song_id, title, artist_id, year, duration)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(song_id) DO NOTHING
        "#,
    )
    .bind(&rec.song_id)
    .bind(&rec.title)
    .bind(&rec.artist_id)
    .bind(rec.year)
    .bind(rec.duration)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn insert_artist(conn: &mut SqliteConnection, rec: &ArtistRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO artists (artist_id, name, location, latitude, longitude)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(artist_id) DO NOTHING
        "#,
    )
    .bind(&rec.artist_id)
    .bind(&rec.name)
    .bind(&rec.location)
    .bind(rec.latitude)
    .bind(rec.longitude)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn insert_time(conn: &mut SqliteConnection, rec: &TimeRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO time (start_time, hour, day, week, month, year, weekday)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(start_time) DO NOTHING
        "#,
    )
    .bind(rec.start_time)
    .bind(rec.hour)
    .bind(rec.day)
    .bind(rec.week)
    .bind(rec.month)
    .bind(rec.year)
    .bind(&rec.weekday)
    .execute(conn)
    .await?;

    Ok(())
}

/// Insert a user row; a user's subscription level changes over time, so
/// the last event seen wins.
pub async fn insert_user(conn: &mut SqliteConnection, rec: &UserRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (user_id, first_name, last_name, gender, level)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET level = excluded.level
        "#,
    )
    .bind(rec.user_id)
    .bind(&rec.first_name)
    .bind(&rec.last_name)
    .bind(&rec.gender)
    .bind(&rec.level)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn insert_songplay(conn: &mut SqliteConnection, rec: &SongplayRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO songplays
            (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(rec.start_time)
    .bind(rec.user_id)
    .bind(&rec.level)
    .bind(&rec.song_id)
    .bind(&rec.artist_id)
    .bind(rec.session_id)
    .bind(&rec.location)
    .bind(&rec.user_agent)
    .execute(conn)
    .await?;

    Ok(())
}

/// Resolve a play event to its (song_id, artist_id) pair by equality on
/// (song title, artist name, duration).
///
/// Exactly one match yields the pair; zero or more than one match is
/// treated as no match.
pub async fn find_song_and_artist(
    conn: &mut SqliteConnection,
    title: &str,
    artist_name: &str,
    duration: f64,
) -> Result<Option<(String, String)>> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT s.song_id, s.artist_id
        FROM songs s
        JOIN artists a ON s.artist_id = a.artist_id
        WHERE s.title = ? AND a.name = ? AND s.duration = ?
        "#,
    )
    .bind(title)
    .bind(artist_name)
    .bind(duration)
    .fetch_all(conn)
    .await?;

    match rows.as_slice() {
        [pair] => Ok(Some(pair.clone())),
        _ => Ok(None),
    }
}
