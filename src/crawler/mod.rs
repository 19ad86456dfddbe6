//! Crawler module for listing page fetching and extraction
//!
//! This module contains the fetch-and-parse half of a poll cycle:
//! - HTTP fetching with bounded, fixed-delay retries
//! - Listing URL construction
//! - HTML extraction of question records
//! - Paginated collection with count, stop-predicate, and page-ceiling bounds

mod collector;
mod fetcher;
mod listing;
mod parser;
mod traits;

pub use collector::{Collector, StopPredicate, MAX_PAGE_CEILING};
pub use fetcher::{build_http_client, Fetcher, UrlBuilder};
pub use listing::{identifier_from_href, listing_url, listing_url_builder};
pub use parser::QuestionExtractor;
pub use traits::{FetchOutcome, PageSource, RecordExtractor};

use crate::config::Config;
use crate::notify::Notifier;
use crate::WatchError;
use std::sync::Arc;

/// Collector wired to the HTTP fetcher and the question extractor
pub type ListingCollector = Collector<Fetcher, QuestionExtractor>;

/// Builds the production collector for a configuration
///
/// # Arguments
///
/// * `config` - The watcher configuration
/// * `notifier` - Sink for fetch and extraction signals
///
/// # Returns
///
/// * `Ok(ListingCollector)` - Ready to collect
/// * `Err(WatchError)` - The URL, HTTP client, or selectors could not be built
pub fn build_collector(
    config: &Config,
    notifier: Arc<dyn Notifier>,
) -> Result<ListingCollector, WatchError> {
    let url_builder = listing_url_builder(&config.target)?;
    let fetcher = Fetcher::from_config(&config.fetch, url_builder, notifier.clone())?;
    let extractor = QuestionExtractor::new(&config.target.base_url)?;

    Ok(Collector::new(fetcher, extractor, notifier).with_max_pages(config.fetch.max_pages))
}
