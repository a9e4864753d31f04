//! # Playlog Common Library
//!
//! Shared code for the playlog batch loader:
//! - Error types
//! - Configuration resolution
//! - Database schema, record models, and the statement catalog

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
