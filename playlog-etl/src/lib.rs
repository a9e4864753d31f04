//! # playlog-etl
//!
//! Batch loader for song metadata documents and listening event logs.
//! Discovers JSON files under two dataset roots and loads them into the
//! normalized schema owned by `playlog-common`, one transaction per file.

pub mod services;

pub use services::pipeline::{process_directory, Dataset};
