//! Notification sinks for watcher signals
//!
//! The core emits [`WatchEvent`] values through a [`Notifier`]. Sinks:
//! - [`LogNotifier`] forwards every signal to `tracing`
//! - [`ConsoleNotifier`] prints the operator-facing status lines
//! - [`Fanout`] forwards to several sinks in order
//!
//! There is no process-wide default notifier; callers construct one and
//! pass it to every component that emits signals.

mod console;
mod event;

pub use console::ConsoleNotifier;
pub use event::WatchEvent;

use std::sync::Arc;

/// Consumer of watcher signals
///
/// Implementations must not block and must not fail; delivery is best effort.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &WatchEvent);
}

/// Forwards signals to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &WatchEvent) {
        match event {
            WatchEvent::WatcherStarted { target, interval } => {
                tracing::info!("Watching '{}', checking every {:?}", target, interval);
            }
            WatchEvent::WatcherStopped { error: None } => {
                tracing::info!("Watcher stopped");
            }
            WatchEvent::WatcherStopped { error: Some(error) } => {
                tracing::error!("Watcher stopped: {}", error);
            }
            WatchEvent::NewRecordsFound { count } => {
                tracing::info!("Found {} new records", count);
            }
            WatchEvent::NoNewRecords => {
                tracing::debug!("No new records");
            }
            WatchEvent::FetchAttempt { address, attempt } => {
                tracing::debug!("Fetching {} (attempt {})", address, attempt);
            }
            WatchEvent::FetchExhausted {
                attempts,
                last_error,
            } => {
                tracing::warn!("Fetch failed after {} attempts: {}", attempts, last_error);
            }
            WatchEvent::ExtractionEmpty { page } => {
                tracing::debug!("Page {} yielded no records", page);
            }
            WatchEvent::StateLoadFailure { error } => {
                tracing::warn!("Failed to load watermark, starting from 0: {}", error);
            }
            WatchEvent::StatePersistFailure { error } => {
                tracing::error!("Failed to persist watermark: {}", error);
            }
            WatchEvent::BacklogSkipped { count, watermark } => {
                tracing::info!(
                    "Skipped {} backlog records, watermark now {}",
                    count,
                    watermark
                );
            }
        }
    }
}

/// Forwards each signal to every contained notifier
#[derive(Clone, Default)]
pub struct Fanout {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink, returning the fanout for chaining
    pub fn with(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Notifier for Fanout {
    fn notify(&self, event: &WatchEvent) {
        for sink in &self.sinks {
            sink.notify(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<WatchEvent>>,
    }

    impl Notifier for Recorder {
        fn notify(&self, event: &WatchEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn test_fanout_forwards_to_every_sink() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let fanout = Fanout::new().with(first.clone()).with(second.clone());

        fanout.notify(&WatchEvent::NoNewRecords);
        fanout.notify(&WatchEvent::NewRecordsFound { count: 2 });

        assert_eq!(fanout.len(), 2);
        assert_eq!(first.events.lock().unwrap().len(), 2);
        assert_eq!(
            second.events.lock().unwrap()[1],
            WatchEvent::NewRecordsFound { count: 2 }
        );
    }

    #[test]
    fn test_empty_fanout_is_noop() {
        let fanout = Fanout::new();
        assert!(fanout.is_empty());
        fanout.notify(&WatchEvent::NoNewRecords);
    }
}
