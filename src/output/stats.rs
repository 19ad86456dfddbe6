//! Statistics generation from the record database
//!
//! This module provides functionality for extracting and displaying
//! what the record store holds.

use crate::storage::{Storage, StorageResult, StoredRecord};

/// Number of recent records included in a statistics report
pub const RECENT_RECORDS: usize = 5;

/// Record store statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Total number of records stored
    pub total_records: u64,

    /// Record counts per target, sorted by target
    pub records_by_target: Vec<(String, u64)>,

    /// Highest identifier stored per target
    pub newest_by_target: Vec<(String, Option<u64>)>,

    /// Most recently stored records, newest first
    pub recent: Vec<StoredRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<StoreStatistics> {
    let total_records = storage.count_records()?;
    let records_by_target = storage.count_by_target()?;

    let newest_by_target = records_by_target
        .iter()
        .map(|(target, _)| Ok((target.clone(), storage.max_identifier(target)?)))
        .collect::<StorageResult<Vec<_>>>()?;

    let recent = storage.latest_records(RECENT_RECORDS)?;

    Ok(StoreStatistics {
        total_records,
        records_by_target,
        newest_by_target,
        recent,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Record Store Statistics ===\n");

    println!("Overview:");
    println!("  Total records stored: {}", stats.total_records);
    println!("  Targets: {}", stats.records_by_target.len());
    println!();

    if !stats.records_by_target.is_empty() {
        println!("Records by Target:");
        for ((target, count), (_, newest)) in
            stats.records_by_target.iter().zip(&stats.newest_by_target)
        {
            let percentage = if stats.total_records > 0 {
                (*count as f64 / stats.total_records as f64) * 100.0
            } else {
                0.0
            };
            match newest {
                Some(id) => println!(
                    "  {}: {} ({:.1}%), newest id {}",
                    target, count, percentage, id
                ),
                None => println!("  {}: {} ({:.1}%)", target, count, percentage),
            }
        }
        println!();
    }

    if !stats.recent.is_empty() {
        println!("Most Recent:");
        for stored in &stats.recent {
            println!(
                "  [{}] {} ({}, first seen {})",
                stored.record.identifier(),
                stored.record.title,
                stored.target,
                stored.first_seen_at
            );
        }
    }
}
