//! playlog-etl - Batch loader entry point
//!
//! Opens one database session, runs the song-data pass and then the
//! log-data pass, and exits. Any unhandled failure propagates out of main
//! with a non-zero exit; already-committed files remain committed.

use anyhow::Result;
use clap::Parser;
use playlog_common::config::EtlConfig;
use playlog_common::db::init_database;
use playlog_etl::{process_directory, Dataset};
use tracing::info;

/// Batch loader for song metadata and listening event logs
#[derive(Debug, Parser)]
#[command(name = "playlog-etl", version)]
struct Args {
    /// Root directory of song metadata documents
    #[arg(long)]
    song_data: Option<String>,

    /// Root directory of event log documents
    #[arg(long)]
    log_data: Option<String>,

    /// Database file path
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting playlog-etl v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = EtlConfig::resolve(
        args.song_data.as_deref(),
        args.log_data.as_deref(),
        args.database.as_deref(),
    );
    info!(
        song_data = %config.song_data.display(),
        log_data = %config.log_data.display(),
        database = %config.database.display(),
        "resolved configuration"
    );

    let pool = init_database(&config.database).await?;
    info!("Database connection established");

    process_directory(&pool, &config.song_data, Dataset::Songs).await?;
    process_directory(&pool, &config.log_data, Dataset::Logs).await?;

    pool.close().await;
    info!("Batch load complete");

    Ok(())
}
