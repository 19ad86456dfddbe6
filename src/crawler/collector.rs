//! Paginated collection of candidate records
//!
//! The collector walks listing pages from page 1, extracting records until
//! one of these happens:
//! - the requested number of records has been gathered
//! - a page cannot be fetched or comes back empty
//! - a page yields no records
//! - the stop predicate matches a record
//! - the page ceiling is reached

use crate::crawler::traits::{FetchOutcome, PageSource, RecordExtractor};
use crate::notify::{Notifier, WatchEvent};
use crate::record::Record;
use std::sync::Arc;

/// Hard upper bound on the page index visited in one collection pass
pub const MAX_PAGE_CEILING: u32 = 100;

/// Predicate marking a record as already seen
///
/// Listings are newest-first, so the first match means everything after it
/// has been seen too and pagination stops there.
pub type StopPredicate<'a> = &'a (dyn Fn(&Record) -> bool + Send + Sync);

/// Drives a page source and an extractor across listing pages
pub struct Collector<S, E> {
    source: S,
    extractor: E,
    max_pages: u32,
    notifier: Arc<dyn Notifier>,
}

impl<S, E> Collector<S, E>
where
    S: PageSource,
    E: RecordExtractor,
{
    /// Creates a collector bounded by [`MAX_PAGE_CEILING`]
    pub fn new(source: S, extractor: E, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            extractor,
            max_pages: MAX_PAGE_CEILING,
            notifier,
        }
    }

    /// Lowers the page ceiling; values above [`MAX_PAGE_CEILING`] are clamped
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.clamp(1, MAX_PAGE_CEILING);
        self
    }

    /// Returns the page source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Collects up to `limit` records in listing order
    ///
    /// When `stop` is given, the first record on a page for which it holds
    /// drops itself and every later record on that page, and no further page
    /// is fetched.
    #[tracing::instrument(level = "debug", skip(self, stop), fields(early_stop = stop.is_some()))]
    pub async fn collect(&self, limit: usize, stop: Option<StopPredicate<'_>>) -> Vec<Record> {
        let mut collected: Vec<Record> = Vec::new();
        let mut page = 1;

        while collected.len() < limit && page <= self.max_pages {
            let payload = match self.source.fetch(page).await {
                FetchOutcome::Page(payload) => payload,
                FetchOutcome::Empty => {
                    tracing::debug!("Page {} is empty, end of listing", page);
                    break;
                }
                FetchOutcome::Exhausted { attempts, .. } => {
                    tracing::debug!(
                        "Page {} unavailable after {} attempts, ending pass",
                        page,
                        attempts
                    );
                    break;
                }
            };

            let mut records = self.extractor.extract(&payload);
            if records.is_empty() {
                self.notifier.notify(&WatchEvent::ExtractionEmpty { page });
                break;
            }

            let stopped = match stop {
                Some(seen) => match records.iter().position(|r| seen(r)) {
                    Some(cut) => {
                        records.truncate(cut);
                        true
                    }
                    None => false,
                },
                None => false,
            };

            tracing::debug!("Page {} contributed {} records", page, records.len());
            collected.extend(records);

            if stopped {
                break;
            }
            page += 1;
        }

        collected.truncate(limit);
        collected
    }
}
