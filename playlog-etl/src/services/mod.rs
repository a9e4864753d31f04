//! ETL services

pub mod file_scanner;
pub mod log_loader;
pub mod pipeline;
pub mod song_loader;

pub use file_scanner::{FileScanner, ScanError};
pub use log_loader::load_log_file;
pub use song_loader::load_song_file;
