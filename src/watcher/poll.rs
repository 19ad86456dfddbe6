//! The poll loop
//!
//! Each cycle runs strictly in order: collect candidates, keep the ones above
//! the watermark, deliver them oldest first, then advance and persist the
//! watermark. Cycles never overlap.

use crate::config::Config;
use crate::crawler::{Collector, PageSource, RecordExtractor};
use crate::notify::{Notifier, WatchEvent};
use crate::output::DisplaySink;
use crate::record::{sort_ascending, Record};
use crate::state::{LoadOutcome, WatermarkTracker};
use crate::storage::Storage;
use crate::watcher::Shutdown;
use crate::WatchError;
use std::sync::Arc;
use std::time::Duration;

/// Per-target loop parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    pub target: String,
    pub interval: Duration,
    pub fetch_limit: usize,
    pub early_stop: bool,
    pub skip_backlog: bool,
}

impl WatchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            target: config.target.label.clone(),
            interval: config.interval(),
            fetch_limit: config.watch.fetch_limit,
            early_stop: config.watch.early_stop,
            skip_backlog: config.watch.skip_backlog,
        }
    }
}

/// Lifecycle of a watcher; `Stopped` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Not yet started: `run` has not been called. Single cycles driven
    /// through `check_once` leave the watcher here.
    Idle,
    /// Inside `run`, polling on the interval
    Running,
    /// `run` has returned, cleanly or with an error
    Stopped,
}

/// What one cycle did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Records returned by the collector
    pub candidates: usize,

    /// Records delivered to the sinks, oldest first
    pub new_records: Vec<Record>,

    /// Records absorbed into the watermark without delivery
    pub skipped: usize,
}

/// Watches one target, delivering each new record exactly once
pub struct Watcher<S, E> {
    collector: Collector<S, E>,
    tracker: WatermarkTracker,
    display: Arc<dyn DisplaySink>,
    storage: Option<Box<dyn Storage>>,
    notifier: Arc<dyn Notifier>,
    settings: WatchSettings,
    state: WatcherState,
    backlog_pending: bool,
}

impl<S, E> Watcher<S, E>
where
    S: PageSource,
    E: RecordExtractor,
{
    /// Creates a watcher without a persistence sink
    ///
    /// With `skip_backlog` set, the backlog is only skipped when the tracker
    /// found no stored watermark.
    pub fn new(
        collector: Collector<S, E>,
        tracker: WatermarkTracker,
        display: Arc<dyn DisplaySink>,
        notifier: Arc<dyn Notifier>,
        settings: WatchSettings,
    ) -> Self {
        let backlog_pending =
            settings.skip_backlog && tracker.load_outcome() == LoadOutcome::Missing;

        Self {
            collector,
            tracker,
            display,
            storage: None,
            notifier,
            settings,
            state: WatcherState::Idle,
            backlog_pending,
        }
    }

    /// Adds a persistence sink that receives every delivered batch
    pub fn with_storage(mut self, storage: Box<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn settings(&self) -> &WatchSettings {
        &self.settings
    }

    pub fn tracker(&self) -> &WatermarkTracker {
        &self.tracker
    }

    pub fn storage(&self) -> Option<&dyn Storage> {
        self.storage.as_deref()
    }

    /// Runs a single poll cycle
    ///
    /// # Returns
    ///
    /// * `Ok(CycleReport)` - The cycle completed, with or without new records
    /// * `Err(WatchError)` - Storing the batch or persisting the watermark failed;
    ///   the watermark file is left at its previous value
    #[tracing::instrument(skip(self), fields(label = %self.settings.target))]
    pub async fn check_once(&mut self) -> Result<CycleReport, WatchError> {
        let limit = self.settings.fetch_limit;
        let candidates = if self.settings.early_stop {
            let seen = self.tracker.stop_predicate();
            self.collector.collect(limit, Some(&seen)).await
        } else {
            self.collector.collect(limit, None).await
        };

        let mut report = CycleReport {
            candidates: candidates.len(),
            ..CycleReport::default()
        };

        let mut fresh = self.tracker.filter_new(&candidates);
        if fresh.is_empty() {
            self.notifier.notify(&WatchEvent::NoNewRecords);
            return Ok(report);
        }
        sort_ascending(&mut fresh);

        if self.backlog_pending {
            self.tracker.advance(&fresh);
            self.tracker.persist()?;
            self.backlog_pending = false;

            self.notifier.notify(&WatchEvent::BacklogSkipped {
                count: fresh.len(),
                watermark: self.tracker.last_seen_id(),
            });
            report.skipped = fresh.len();
            return Ok(report);
        }

        self.notifier.notify(&WatchEvent::NewRecordsFound { count: fresh.len() });
        self.display.display(&fresh);

        if let Some(storage) = self.storage.as_mut() {
            storage.insert_records(&self.settings.target, &fresh)?;
        }

        self.tracker.advance(&fresh);
        self.tracker.persist()?;

        report.new_records = fresh;
        Ok(report)
    }

    /// Polls until `shutdown` is triggered or a cycle fails
    ///
    /// A stop request is honored before a cycle starts or during the sleep
    /// between cycles. The watermark is persisted once more on the way out.
    /// A failed cycle ends the loop; it is never retried here.
    pub async fn run(&mut self, shutdown: &Shutdown) -> Result<(), WatchError> {
        self.state = WatcherState::Running;
        self.notifier.notify(&WatchEvent::WatcherStarted {
            target: self.settings.target.clone(),
            interval: self.settings.interval,
        });

        while !shutdown.is_triggered() {
            if let Err(e) = self.check_once().await {
                self.state = WatcherState::Stopped;
                self.notifier.notify(&WatchEvent::WatcherStopped {
                    error: Some(e.to_string()),
                });
                return Err(e);
            }

            tokio::select! {
                _ = shutdown.triggered() => break,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        self.state = WatcherState::Stopped;
        self.notifier
            .notify(&WatchEvent::WatcherStopped { error: None });
        self.tracker.persist()?;
        Ok(())
    }
}
