//! Watcher module driving poll cycles for one target
//!
//! This module contains the orchestration layer:
//! - The RUNNING/STOPPED poll loop and its single-cycle step
//! - The cooperative shutdown token that ends the loop

mod poll;
mod shutdown;

pub use poll::{CycleReport, WatchSettings, Watcher, WatcherState};
pub use shutdown::Shutdown;

use crate::config::Config;
use crate::crawler::{build_collector, Fetcher, QuestionExtractor};
use crate::notify::Notifier;
use crate::output::DisplaySink;
use crate::state::WatermarkTracker;
use crate::storage::SqliteStorage;
use crate::WatchError;
use std::path::Path;
use std::sync::Arc;

/// Watcher wired to the HTTP fetcher and the question extractor
pub type ListingWatcher = Watcher<Fetcher, QuestionExtractor>;

/// Builds the production watcher for a configuration
///
/// Opens the watermark file and, when `database-path` is set, the SQLite
/// record store.
///
/// # Arguments
///
/// * `config` - The watcher configuration
/// * `display` - Sink for each delivered batch
/// * `notifier` - Sink for every signal the watcher emits
///
/// # Returns
///
/// * `Ok(ListingWatcher)` - Ready to run
/// * `Err(WatchError)` - The collector or the record store could not be built
pub fn build_watcher(
    config: &Config,
    display: Arc<dyn DisplaySink>,
    notifier: Arc<dyn Notifier>,
) -> Result<ListingWatcher, WatchError> {
    let collector = build_collector(config, notifier.clone())?;
    let tracker = WatermarkTracker::open(config.state_path(), notifier.clone());
    tracing::info!(
        "Watermark for '{}' starts at {} ({})",
        config.target.label,
        tracker.last_seen_id(),
        tracker.path().display()
    );

    let watcher = Watcher::new(
        collector,
        tracker,
        display,
        notifier,
        WatchSettings::from_config(config),
    );

    match &config.output.database_path {
        Some(path) => {
            let storage = SqliteStorage::new(Path::new(path))?;
            tracing::info!("Storing delivered records in {}", path);
            Ok(watcher.with_storage(Box::new(storage)))
        }
        None => Ok(watcher),
    }
}
