//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::record::Record;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::StoredRecord;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RECORD_COLUMNS: &str = "identifier, target, title, location, summary, \
     observed_at, score, response_count, view_count, first_seen_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn to_db_id(identifier: u64) -> StorageResult<i64> {
    i64::try_from(identifier).map_err(|_| {
        StorageError::Database(format!("identifier {} exceeds the storable range", identifier))
    })
}

fn to_db_count(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn row_to_stored(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    let mut record = Record::new(row.get::<_, i64>(0)? as u64);
    record.title = row.get(2)?;
    record.location = row.get(3)?;
    record.summary = row.get(4)?;
    record.observed_at = row.get(5)?;
    record.score = row.get::<_, i64>(6)? as u64;
    record.response_count = row.get::<_, i64>(7)? as u64;
    record.view_count = row.get::<_, i64>(8)? as u64;

    Ok(StoredRecord {
        target: row.get(1)?,
        record,
        first_seen_at: row.get(9)?,
    })
}

impl SqliteStorage {
    /// Loads the labels of one record in their listing order
    fn load_labels(&self, identifier: u64) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT label FROM record_labels WHERE identifier = ?1 ORDER BY position",
        )?;

        let labels = stmt
            .query_map(params![to_db_id(identifier)?], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(labels)
    }

    fn with_labels(&self, mut stored: StoredRecord) -> StorageResult<StoredRecord> {
        stored.record.labels = self.load_labels(stored.record.identifier())?;
        Ok(stored)
    }
}

impl Storage for SqliteStorage {
    // ===== Writes =====

    fn insert_records(&mut self, target: &str, records: &[Record]) -> StorageResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR IGNORE INTO records ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                RECORD_COLUMNS
            ))?;
            let mut label_stmt = tx.prepare(
                "INSERT INTO record_labels (identifier, position, label) VALUES (?1, ?2, ?3)",
            )?;

            for record in records {
                let identifier = to_db_id(record.identifier())?;
                let changed = stmt.execute(params![
                    identifier,
                    target,
                    record.title,
                    record.location,
                    record.summary,
                    record.observed_at,
                    to_db_count(record.score),
                    to_db_count(record.response_count),
                    to_db_count(record.view_count),
                    now,
                ])?;

                // Labels follow the row: an ignored duplicate keeps its original set
                if changed == 0 {
                    continue;
                }
                for (position, label) in record.labels.iter().enumerate() {
                    label_stmt.execute(params![identifier, position as i64, label])?;
                }
                inserted += changed;
            }
        }

        tx.commit()?;

        tracing::debug!(
            "Stored {} of {} records for '{}'",
            inserted,
            records.len(),
            target
        );
        Ok(inserted)
    }

    // ===== Reads =====

    fn get_record(&self, identifier: u64) -> StorageResult<Option<StoredRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM records WHERE identifier = ?1",
            RECORD_COLUMNS
        ))?;

        let record = stmt
            .query_row(params![to_db_id(identifier)?], row_to_stored)
            .optional()?;

        record.map(|stored| self.with_labels(stored)).transpose()
    }

    fn count_records(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_target(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT target, COUNT(*) FROM records GROUP BY target ORDER BY target")?;

        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn max_identifier(&self, target: &str) -> StorageResult<Option<u64>> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(identifier) FROM records WHERE target = ?1",
            params![target],
            |row| row.get(0),
        )?;
        Ok(max.map(|id| id as u64))
    }

    fn latest_records(&self, limit: usize) -> StorageResult<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM records ORDER BY identifier DESC LIMIT ?1",
            RECORD_COLUMNS
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![limit], row_to_stored)?
            .collect::<Result<Vec<_>, _>>()?;

        records
            .into_iter()
            .map(|stored| self.with_labels(stored))
            .collect()
    }
}
