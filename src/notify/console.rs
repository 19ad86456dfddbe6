//! Operator-facing status lines on stdout

use crate::notify::{Notifier, WatchEvent};
use chrono::Local;

/// Prints watcher lifecycle and cycle results for a human at the terminal
///
/// Fetch-level and state-level signals are left to the log sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Renders the line printed for an event, if any
    pub fn render(event: &WatchEvent) -> Option<String> {
        match event {
            WatchEvent::WatcherStarted { target, interval } => Some(format!(
                "🚀 Watching '{}', checking every {} seconds.",
                target,
                interval.as_secs()
            )),
            WatchEvent::WatcherStopped { error: None } => Some("\n🛑 Watcher stopped.".to_string()),
            WatchEvent::WatcherStopped { error: Some(error) } => {
                Some(format!("\n🛑 Watcher stopped: {}", error))
            }
            WatchEvent::NewRecordsFound { count } => {
                Some(format!("\n🔔 Found {} new questions:", count))
            }
            WatchEvent::NoNewRecords => Some(format!(
                "⏳ No new questions. Last check: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            )),
            WatchEvent::BacklogSkipped { count, watermark } => Some(format!(
                "⏭️ Skipped {} existing questions, watching for ids above {}.",
                count, watermark
            )),
            WatchEvent::FetchAttempt { .. }
            | WatchEvent::FetchExhausted { .. }
            | WatchEvent::ExtractionEmpty { .. }
            | WatchEvent::StateLoadFailure { .. }
            | WatchEvent::StatePersistFailure { .. } => None,
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, event: &WatchEvent) {
        if let Some(line) = Self::render(event) {
            println!("{}", line);
        }
    }
}
