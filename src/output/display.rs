//! Human-readable rendering of delivered records

use crate::record::Record;
use std::fmt::Write;

/// Receives each batch of new records, oldest first
pub trait DisplaySink: Send + Sync {
    fn display(&self, records: &[Record]);
}

/// Prints records to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleDisplay;

impl DisplaySink for ConsoleDisplay {
    fn display(&self, records: &[Record]) {
        print!("{}", format_records(records));
    }
}

/// Renders records as numbered blocks separated by a rule
///
/// Excerpt whitespace is collapsed so multi-line excerpts stay on one line.
pub fn format_records(records: &[Record]) -> String {
    let mut out = String::new();

    for (idx, record) in records.iter().enumerate() {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}. [{}] {}", idx + 1, record.identifier(), record.title);
        let _ = writeln!(out, "   📅 {}", record.observed_at);
        let _ = writeln!(out, "   🔗 {}", record.location);
        let _ = writeln!(out, "   📝 {}", collapse_whitespace(&record.summary));
        let _ = writeln!(out, "   🏷️ {}", record.labels.join(", "));
        let _ = writeln!(
            out,
            "   👍 Votes: {} | 📄 Answers: {} | 👀 Views: {}",
            record.score, record.response_count, record.view_count
        );
        let _ = writeln!(out, "{}", "-".repeat(80));
    }

    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
