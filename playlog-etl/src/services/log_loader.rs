//! Log document loader
//!
//! A log document is JSON lines, one event per line. Only NextSong events
//! produce rows; everything else is discarded by the page filter. Emission
//! order within a file: time rows, then user rows, then songplay rows,
//! each group in event order.

use playlog_common::db::models::{LogEvent, NextSongEvent, TimeRecord};
use playlog_common::db::queries::{
    find_song_and_artist, insert_songplay, insert_time, insert_user,
};
use playlog_common::{Error, Result};
use sqlx::SqliteConnection;
use std::path::Path;
use tracing::debug;

/// Load one log document into the time, users, and songplays tables.
pub async fn load_log_file(conn: &mut SqliteConnection, path: &Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(path).await?;

    let mut plays = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let event: LogEvent = serde_json::from_str(line).map_err(|e| {
            Error::MalformedRecord(format!("{} line {}: {}", path.display(), lineno + 1, e))
        })?;

        if event.page == "NextSong" {
            plays.push(NextSongEvent::from_event(event)?);
        }
    }

    for play in &plays {
        let time = TimeRecord::from_epoch_millis(play.ts)?;
        insert_time(conn, &time).await?;
    }

    for play in &plays {
        insert_user(conn, &play.user_record()).await?;
    }

    for play in &plays {
        // No unique match resolves to (null, null); the play is recorded
        // either way.
        let resolved = find_song_and_artist(conn, &play.song, &play.artist, play.length).await?;
        insert_songplay(conn, &play.songplay_record(resolved)).await?;
    }

    debug!(
        plays = plays.len(),
        path = %path.display(),
        "loaded log document"
    );

    Ok(())
}
