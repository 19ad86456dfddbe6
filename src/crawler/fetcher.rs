//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the watcher, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests for listing pages
//! - Bounded retry with a fixed delay between attempts

use crate::config::FetchConfig;
use crate::crawler::traits::{FetchOutcome, PageSource};
use crate::notify::{Notifier, WatchEvent};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Maps a 1-based page index to the address to request
pub type UrlBuilder = Box<dyn Fn(u32) -> String + Send + Sync>;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use stackwatch::config::FetchConfig;
/// use stackwatch::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml"),
    );

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches listing pages with a bounded number of attempts
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx, non-blank body | Return the page |
/// | HTTP 2xx, blank body | Return `Empty` |
/// | HTTP 2xx, body cannot be read or decoded | Return `Empty`, no retry |
/// | HTTP non-2xx | Attempt failed |
/// | Timeout / DNS / connection error | Attempt failed |
///
/// A failed attempt is followed by a fixed delay and another attempt, up to
/// `retries` attempts in total. There is no backoff growth.
pub struct Fetcher {
    client: Client,
    url_builder: UrlBuilder,
    retries: u32,
    delay: Duration,
    notifier: Arc<dyn Notifier>,
}

impl Fetcher {
    /// Creates a new fetcher
    ///
    /// `retries` counts every attempt including the first and is raised to 1
    /// when zero.
    pub fn new(
        client: Client,
        url_builder: UrlBuilder,
        retries: u32,
        delay: Duration,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            url_builder,
            retries: retries.max(1),
            delay,
            notifier,
        }
    }

    /// Creates a fetcher from configuration, building its own client
    pub fn from_config(
        config: &FetchConfig,
        url_builder: UrlBuilder,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::new(
            client,
            url_builder,
            config.retries,
            config.retry_delay(),
            notifier,
        ))
    }

    /// Returns the address for a page without fetching it
    pub fn url_for(&self, page: u32) -> String {
        (self.url_builder)(page)
    }

    /// Number of attempts made per page
    pub fn retries(&self) -> u32 {
        self.retries
    }

    async fn attempt(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.client.get(url).send().await?.error_for_status()
    }
}

#[async_trait]
impl PageSource for Fetcher {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn fetch(&self, page: u32) -> FetchOutcome {
        let url = self.url_for(page);
        let mut last_error = String::new();

        for attempt in 1..=self.retries {
            self.notifier.notify(&WatchEvent::FetchAttempt {
                address: url.clone(),
                attempt,
            });

            match self.attempt(&url).await {
                // The server answered; a body that fails to decode is final
                Ok(response) => {
                    return match response.text().await {
                        Ok(body) if body.trim().is_empty() => FetchOutcome::Empty,
                        Ok(body) => FetchOutcome::Page(body),
                        Err(e) => {
                            tracing::warn!("Could not read body of page {}: {}", page, e);
                            FetchOutcome::Empty
                        }
                    };
                }
                Err(e) => {
                    tracing::warn!("Attempt {} for page {} failed: {}", attempt, page, e);
                    last_error = e.to_string();
                }
            }

            if attempt < self.retries {
                tokio::time::sleep(self.delay).await;
            }
        }

        self.notifier.notify(&WatchEvent::FetchExhausted {
            attempts: self.retries,
            last_error: last_error.clone(),
        });

        FetchOutcome::Exhausted {
            attempts: self.retries,
            last_error,
        }
    }
}
