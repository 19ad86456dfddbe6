//! Capability traits injected into the collector
//!
//! Fetching and extraction are separate seams so the pagination logic can be
//! driven by an HTTP fetcher in production and by in-memory stubs in tests.

use crate::record::Record;
use async_trait::async_trait;

/// Result of fetching one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A successful response with a non-blank body
    Page(String),

    /// A successful response with nothing usable in it (blank or undecodable)
    Empty,

    /// Every attempt failed
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Description of the final failure
        last_error: String,
    },
}

/// Produces the raw payload for a page index (1-based)
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, page: u32) -> FetchOutcome;
}

/// Converts one raw payload into candidate records, in page order
///
/// Implementations must be deterministic and total: malformed markup degrades
/// fields to defaults instead of failing.
pub trait RecordExtractor: Send + Sync {
    fn extract(&self, payload: &str) -> Vec<Record>;
}
