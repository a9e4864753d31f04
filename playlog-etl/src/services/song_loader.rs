//! Song document loader
//!
//! One JSON object per file: yields one songs row and one artists row,
//! field values verbatim.

use playlog_common::db::models::SongDocument;
use playlog_common::db::queries::{insert_artist, insert_song};
use playlog_common::{Error, Result};
use sqlx::SqliteConnection;
use std::path::Path;
use tracing::debug;

/// Load one song document into the songs and artists tables.
pub async fn load_song_file(conn: &mut SqliteConnection, path: &Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(path).await?;

    let doc: SongDocument = serde_json::from_str(contents.trim())
        .map_err(|e| Error::MalformedRecord(format!("{}: {}", path.display(), e)))?;

    insert_song(conn, &doc.song_record()).await?;
    insert_artist(conn, &doc.artist_record()).await?;

    debug!(
        song_id = %doc.song_id,
        artist_id = %doc.artist_id,
        "loaded song document"
    );

    Ok(())
}
