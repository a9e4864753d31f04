//! End-to-end tests for the batch pipeline
//!
//! Builds both dataset roots in a scratch directory, runs the song pass
//! and the log pass against a scratch database, and inspects the loaded
//! schema.

use playlog_common::db::init_database;
use playlog_etl::{process_directory, Dataset};
use sqlx::SqlitePool;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    song_root: PathBuf,
    log_root: PathBuf,
    pool: SqlitePool,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let song_root = dir.path().join("song_data");
    let log_root = dir.path().join("log_data");
    fs::create_dir_all(song_root.join("A")).unwrap();
    fs::create_dir_all(&log_root).unwrap();

    let pool = init_database(&dir.path().join("playlog.db")).await.unwrap();

    Fixture {
        _dir: dir,
        song_root,
        log_root,
        pool,
    }
}

fn write_song_file(fixture: &Fixture) {
    // Nested one level to exercise recursive discovery
    fs::write(
        fixture.song_root.join("A").join("SOSCIUK12.json"),
        r#"{"num_songs": 1, "artist_id": "ARD7TVE1", "artist_latitude": null,
            "artist_longitude": null, "artist_location": "California - LA",
            "artist_name": "Casual", "song_id": "SOSCIUK12",
            "title": "I Didn't Mean To", "duration": 200.5, "year": 1994}"#,
    )
    .unwrap();
}

fn write_log_file(fixture: &Fixture) {
    // One matching play, one play with a duration that matches nothing,
    // and one non-NextSong event
    let lines = [
        r#"{"page": "NextSong", "ts": 1541121934796, "song": "I Didn't Mean To", "artist": "Casual", "length": 200.5, "userId": "39", "firstName": "Walter", "lastName": "Frye", "gender": "M", "level": "free", "sessionId": 38, "location": "San Francisco-Oakland-Hayward, CA", "userAgent": "Mozilla/5.0"}"#,
        r#"{"page": "NextSong", "ts": 1541121994796, "song": "I Didn't Mean To", "artist": "Casual", "length": 200.6, "userId": "39", "firstName": "Walter", "lastName": "Frye", "gender": "M", "level": "free", "sessionId": 38, "location": "San Francisco-Oakland-Hayward, CA", "userAgent": "Mozilla/5.0"}"#,
        r#"{"page": "Home", "ts": 1541122004796, "song": null, "artist": null, "length": null, "userId": "39", "firstName": "Walter", "lastName": "Frye", "gender": "M", "level": "free", "sessionId": 38, "location": "San Francisco-Oakland-Hayward, CA", "userAgent": "Mozilla/5.0"}"#,
    ];
    fs::write(
        fixture.log_root.join("2018-11-02-events.json"),
        lines.join("\n"),
    )
    .unwrap();
}

async fn table_count(pool: &SqlitePool, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

#[tokio::test]
async fn end_to_end_load() {
    let fixture = fixture().await;
    write_song_file(&fixture);
    write_log_file(&fixture);

    let songs_processed = process_directory(&fixture.pool, &fixture.song_root, Dataset::Songs)
        .await
        .unwrap();
    let logs_processed = process_directory(&fixture.pool, &fixture.log_root, Dataset::Logs)
        .await
        .unwrap();
    assert_eq!(songs_processed, 1);
    assert_eq!(logs_processed, 1);

    // Song and artist rows retrievable by their source-supplied ids
    let song: (String, String) =
        sqlx::query_as("SELECT song_id, title FROM songs WHERE song_id = 'SOSCIUK12'")
            .fetch_one(&fixture.pool)
            .await
            .unwrap();
    assert_eq!(song, ("SOSCIUK12".into(), "I Didn't Mean To".into()));

    let artist: (String, String) =
        sqlx::query_as("SELECT artist_id, name FROM artists WHERE artist_id = 'ARD7TVE1'")
            .fetch_one(&fixture.pool)
            .await
            .unwrap();
    assert_eq!(artist, ("ARD7TVE1".into(), "Casual".into()));

    // Two NextSong events, one Home event
    assert_eq!(table_count(&fixture.pool, "time").await, 2);
    assert_eq!(table_count(&fixture.pool, "users").await, 1);
    assert_eq!(table_count(&fixture.pool, "songplays").await, 2);

    // length 200.5 resolves; length 200.6 does not, but the play is kept
    let resolved: (Option<String>, Option<String>) = sqlx::query_as(
        "SELECT song_id, artist_id FROM songplays WHERE start_time = 1541121934796",
    )
    .fetch_one(&fixture.pool)
    .await
    .unwrap();
    assert_eq!(resolved, (Some("SOSCIUK12".into()), Some("ARD7TVE1".into())));

    let unresolved: (Option<String>, Option<String>) = sqlx::query_as(
        "SELECT song_id, artist_id FROM songplays WHERE start_time = 1541121994796",
    )
    .fetch_one(&fixture.pool)
    .await
    .unwrap();
    assert_eq!(unresolved, (None, None));
}

#[tokio::test]
async fn rerun_duplicates_songplays_only() {
    let fixture = fixture().await;
    write_song_file(&fixture);
    write_log_file(&fixture);

    for _ in 0..2 {
        process_directory(&fixture.pool, &fixture.song_root, Dataset::Songs)
            .await
            .unwrap();
        process_directory(&fixture.pool, &fixture.log_root, Dataset::Logs)
            .await
            .unwrap();
    }

    // Dimension tables are idempotent; the fact table keeps plain inserts
    assert_eq!(table_count(&fixture.pool, "songs").await, 1);
    assert_eq!(table_count(&fixture.pool, "artists").await, 1);
    assert_eq!(table_count(&fixture.pool, "time").await, 2);
    assert_eq!(table_count(&fixture.pool, "users").await, 1);
    assert_eq!(table_count(&fixture.pool, "songplays").await, 4);
}

#[tokio::test]
async fn empty_roots_are_not_an_error() {
    let fixture = fixture().await;

    let processed = process_directory(&fixture.pool, &fixture.song_root, Dataset::Songs)
        .await
        .unwrap();
    assert_eq!(processed, 0);
}

#[tokio::test]
async fn missing_root_aborts_before_processing() {
    let fixture = fixture().await;

    let result = process_directory(
        &fixture.pool,
        &fixture._dir.path().join("no_such_root"),
        Dataset::Songs,
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn malformed_file_fails_fast_but_keeps_committed_files() {
    let fixture = fixture().await;
    write_song_file(&fixture);
    // A second, malformed song document; traversal order puts the nested
    // valid file and this one in the same pass
    fs::write(fixture.song_root.join("zzz-bad.json"), "{\"song_id\": 1}").unwrap();

    let result = process_directory(&fixture.pool, &fixture.song_root, Dataset::Songs).await;
    assert!(result.is_err());

    // Whatever committed before the failure stays committed; nothing was
    // rolled back globally
    let songs = table_count(&fixture.pool, "songs").await;
    assert!(songs <= 1);
}
