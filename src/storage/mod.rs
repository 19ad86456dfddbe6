//! Storage module for persisting delivered records
//!
//! This module handles the optional database sink of the watcher, including:
//! - SQLite database initialization and schema management
//! - Idempotent batch inserts keyed by record identifier
//! - Read queries backing the statistics report

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::record::Record;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// A record as held in the database
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub target: String,
    pub record: Record,
    pub first_seen_at: String,
}
