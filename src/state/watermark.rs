//! High-water-mark novelty tracking
//!
//! The tracker holds the largest record identifier ever delivered for one
//! target. Candidates at or below it are treated as already seen. The value
//! is stored as a decimal string in a plain text file and is only ever moved
//! forward.

use crate::notify::{Notifier, WatchEvent};
use crate::record::Record;
use crate::state::StateError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the current watermark came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Read from the stored file
    Stored,
    /// No file existed; started at 0
    Missing,
    /// The file could not be read or parsed; started at 0
    Corrupt,
}

/// Tracks and persists the highest identifier accepted for a target
pub struct WatermarkTracker {
    path: PathBuf,
    last_seen_id: u64,
    outcome: LoadOutcome,
    notifier: Arc<dyn Notifier>,
}

impl WatermarkTracker {
    /// Opens the tracker for the watermark file at `path`, loading its value
    pub fn open(path: impl Into<PathBuf>, notifier: Arc<dyn Notifier>) -> Self {
        let mut tracker = Self {
            path: path.into(),
            last_seen_id: 0,
            outcome: LoadOutcome::Missing,
            notifier,
        };
        tracker.load();
        tracker
    }

    /// Reads the stored watermark
    ///
    /// A missing file yields 0. An unreadable or non-numeric file also yields
    /// 0 after emitting a state-load-failure signal; it never fails.
    pub fn load(&mut self) -> u64 {
        let (value, outcome) = match fs::read_to_string(&self.path) {
            Ok(content) => match content.trim().parse::<u64>() {
                Ok(value) => (value, LoadOutcome::Stored),
                Err(e) => {
                    self.load_failed(format!(
                        "invalid watermark {:?} in {}: {}",
                        content.trim(),
                        self.path.display(),
                        e
                    ));
                    (0, LoadOutcome::Corrupt)
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => (0, LoadOutcome::Missing),
            Err(e) => {
                self.load_failed(format!("failed to read {}: {}", self.path.display(), e));
                (0, LoadOutcome::Corrupt)
            }
        };

        self.last_seen_id = value;
        self.outcome = outcome;
        tracing::debug!(
            "Loaded watermark {} from {} ({:?})",
            value,
            self.path.display(),
            outcome
        );
        value
    }

    fn load_failed(&self, error: String) {
        self.notifier
            .notify(&WatchEvent::StateLoadFailure { error });
    }

    /// Returns the current watermark
    pub fn last_seen_id(&self) -> u64 {
        self.last_seen_id
    }

    /// Returns how the watermark was obtained at the last load
    pub fn load_outcome(&self) -> LoadOutcome {
        self.outcome
    }

    /// Path of the watermark file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the candidates strictly above the watermark, in input order
    pub fn filter_new(&self, candidates: &[Record]) -> Vec<Record> {
        candidates
            .iter()
            .filter(|r| r.identifier() > self.last_seen_id)
            .cloned()
            .collect()
    }

    /// Moves the watermark to the largest identifier in `new_records`
    ///
    /// An empty batch is a no-op, and the watermark never decreases.
    pub fn advance(&mut self, new_records: &[Record]) {
        if let Some(max) = new_records.iter().map(Record::identifier).max() {
            self.last_seen_id = self.last_seen_id.max(max);
        }
    }

    /// Returns a predicate matching records at or below the current watermark
    pub fn stop_predicate(&self) -> impl Fn(&Record) -> bool + Send + Sync + 'static {
        let watermark = self.last_seen_id;
        move |record: &Record| record.identifier() <= watermark
    }

    /// Writes the watermark to disk
    ///
    /// The value goes to a sibling temporary file first and is then renamed
    /// over the target, so readers see either the old or the new value.
    pub fn persist(&self) -> Result<(), StateError> {
        match write_atomically(&self.path, &self.last_seen_id.to_string()) {
            Ok(()) => {
                tracing::debug!(
                    "Persisted watermark {} to {}",
                    self.last_seen_id,
                    self.path.display()
                );
                Ok(())
            }
            Err(source) => {
                self.notifier.notify(&WatchEvent::StatePersistFailure {
                    error: source.to_string(),
                });
                Err(StateError::Persist {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }

    /// Deletes a stored watermark so the next load starts from 0
    pub fn reset(path: &Path) -> Result<(), StateError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StateError::Reset {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn write_atomically(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path)
}
