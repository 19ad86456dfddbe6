//! Signals emitted by the watcher core

use std::time::Duration;

/// A one-way notification emitted by the fetcher, collector, tracker, or poll loop
///
/// The set is closed: every notifier dispatches with an exhaustive match, so a
/// new signal cannot be added without every sink deciding how to handle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The poll loop entered RUNNING
    WatcherStarted { target: String, interval: Duration },

    /// The poll loop reached STOPPED; `error` is set when a cycle failed
    WatcherStopped { error: Option<String> },

    /// A cycle produced new records
    NewRecordsFound { count: usize },

    /// A cycle produced nothing new
    NoNewRecords,

    /// One HTTP attempt is about to be made
    FetchAttempt { address: String, attempt: u32 },

    /// Every attempt for a page failed
    FetchExhausted { attempts: u32, last_error: String },

    /// A fetched page yielded no records
    ExtractionEmpty { page: u32 },

    /// The stored watermark could not be read; tracking restarted from zero
    StateLoadFailure { error: String },

    /// The watermark could not be written
    StatePersistFailure { error: String },

    /// First-run backlog absorbed into the watermark without delivery
    BacklogSkipped { count: usize, watermark: u64 },
}
