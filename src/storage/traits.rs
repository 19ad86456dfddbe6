//! Storage traits and error types
//!
//! This module defines the trait interface for record persistence backends
//! and associated error types.

use crate::record::Record;
use crate::storage::StoredRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record persistence backends
///
/// The watcher issues at most one write per cycle and waits for it before
/// moving on. Writes are idempotent per identifier: a record that is already
/// stored is left untouched.
pub trait Storage: Send {
    // ===== Writes =====

    /// Stores a batch of records for a target
    ///
    /// # Arguments
    ///
    /// * `target` - The label the records were collected for
    /// * `records` - The records to store
    ///
    /// # Returns
    ///
    /// The number of records that were not already stored
    fn insert_records(&mut self, target: &str, records: &[Record]) -> StorageResult<usize>;

    // ===== Reads =====

    /// Gets a stored record by identifier
    fn get_record(&self, identifier: u64) -> StorageResult<Option<StoredRecord>>;

    /// Counts all stored records
    fn count_records(&self) -> StorageResult<u64>;

    /// Counts stored records grouped by target, sorted by target
    fn count_by_target(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Gets the largest stored identifier for a target
    fn max_identifier(&self, target: &str) -> StorageResult<Option<u64>>;

    /// Gets the most recently stored records, newest identifier first
    fn latest_records(&self, limit: usize) -> StorageResult<Vec<StoredRecord>>;
}
