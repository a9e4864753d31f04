//! Batch processor
//!
//! Materializes the full file list before any processing begins, then
//! handles one file per transaction: load, commit, report progress. A
//! failure propagates immediately; files already committed stay committed
//! and later files are never attempted.

use crate::services::file_scanner::FileScanner;
use crate::services::{load_log_file, load_song_file};
use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Which family of documents a dataset root holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Songs,
    Logs,
}

/// Process every JSON document under a dataset root.
///
/// Returns the number of files processed. Progress lines go to stdout;
/// they are part of the process contract.
pub async fn process_directory(pool: &SqlitePool, root: &Path, dataset: Dataset) -> Result<usize> {
    let scanner = FileScanner::new();
    let files = scanner
        .scan(root)
        .with_context(|| format!("discovering files under {}", root.display()))?;
    let total = files.len();

    println!("{} files found in {}", total, root.display());
    info!(total, root = %root.display(), ?dataset, "discovered input files");

    for (i, path) in files.iter().enumerate() {
        let mut tx = pool.begin().await?;
        match dataset {
            Dataset::Songs => load_song_file(&mut tx, path).await,
            Dataset::Logs => load_log_file(&mut tx, path).await,
        }
        .with_context(|| format!("processing {}", path.display()))?;
        tx.commit().await?;

        println!("{}/{} files processed.", i + 1, total);
    }

    info!(total, root = %root.display(), "dataset pass complete");
    Ok(total)
}
