//! HTML extractor for question listing pages
//!
//! This module turns one rendered listing page into records:
//! - identifier and address from the title link
//! - title, excerpt, tags, and timestamp text
//! - score, answer, and view counts from the stats column
//!
//! Missing or malformed fields fall back to empty text or zero. A summary
//! without a recognizable question link is skipped, since it has no
//! identifier to track.

use crate::crawler::listing::identifier_from_href;
use crate::crawler::traits::RecordExtractor;
use crate::record::Record;
use crate::{ConfigError, WatchError};
use scraper::{ElementRef, Html, Selector};
use url::Url;

const SUMMARY: &str = ".s-post-summary";
const TITLE_LINK: &str = ".s-post-summary--content-title a";
const EXCERPT: &str = ".s-post-summary--content-excerpt";
const TAG: &str = ".post-tag";
const TIMESTAMP: &str = ".relativetime";
const VOTES: &str = ".s-post-summary--stats-item:nth-child(1) span";
const ANSWERS: &str = ".s-post-summary--stats-item:nth-child(2) span";
const VIEWS: &str = ".s-post-summary--stats-item:nth-child(3) span";

/// Compiled selectors for the question listing markup
#[derive(Debug, Clone)]
struct Selectors {
    summary: Selector,
    title_link: Selector,
    excerpt: Selector,
    tag: Selector,
    timestamp: Selector,
    votes: Selector,
    answers: Selector,
    views: Selector,
}

impl Selectors {
    fn compile() -> Result<Self, WatchError> {
        Ok(Self {
            summary: compile(SUMMARY)?,
            title_link: compile(TITLE_LINK)?,
            excerpt: compile(EXCERPT)?,
            tag: compile(TAG)?,
            timestamp: compile(TIMESTAMP)?,
            votes: compile(VOTES)?,
            answers: compile(ANSWERS)?,
            views: compile(VIEWS)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, WatchError> {
    Selector::parse(selector).map_err(|e| WatchError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Extracts question records from a listing page
///
/// # Example
///
/// ```
/// use stackwatch::crawler::{QuestionExtractor, RecordExtractor};
///
/// let html = r#"<div class="s-post-summary">
///   <h3 class="s-post-summary--content-title"><a href="/questions/7/title">Title</a></h3>
/// </div>"#;
/// let extractor = QuestionExtractor::new("https://stackoverflow.com").unwrap();
/// let records = extractor.extract(html);
/// assert_eq!(records[0].identifier(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct QuestionExtractor {
    base_url: Url,
    selectors: Selectors,
}

impl QuestionExtractor {
    /// Creates an extractor that resolves relative links against `base_url`
    ///
    /// Links are resolved the way a browser would: `/questions/..` replaces
    /// any path on the base, while `questions/..` is appended to it.
    pub fn new(base_url: &str) -> Result<Self, WatchError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            selectors: Selectors::compile()?,
        })
    }

    fn extract_summary(&self, summary: ElementRef<'_>) -> Option<Record> {
        let link = summary.select(&self.selectors.title_link).next()?;
        let href = link.value().attr("href")?;

        let Some(identifier) = identifier_from_href(href) else {
            tracing::debug!("Skipping summary with unrecognized link: {}", href);
            return None;
        };

        let mut record = Record::new(identifier).with_title(element_text(link));
        record.location = self.absolute(href);
        record.summary = summary
            .select(&self.selectors.excerpt)
            .next()
            .map(element_text)
            .unwrap_or_default();
        record.labels = summary
            .select(&self.selectors.tag)
            .map(element_text)
            .filter(|tag| !tag.is_empty())
            .collect();
        record.observed_at = summary
            .select(&self.selectors.timestamp)
            .next()
            .and_then(|e| e.value().attr("title"))
            .unwrap_or_default()
            .to_string();
        record.score = self.count(summary, &self.selectors.votes);
        record.response_count = self.count(summary, &self.selectors.answers);
        record.view_count = self.count(summary, &self.selectors.views);

        Some(record)
    }

    fn count(&self, summary: ElementRef<'_>, selector: &Selector) -> u64 {
        summary
            .select(selector)
            .next()
            .map(element_text)
            .and_then(|text| parse_count(&text))
            .unwrap_or(0)
    }

    fn absolute(&self, href: &str) -> String {
        match self.base_url.join(href) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::debug!("Could not resolve link {}: {}", href, e);
                String::new()
            }
        }
    }
}

impl RecordExtractor for QuestionExtractor {
    fn extract(&self, payload: &str) -> Vec<Record> {
        let document = Html::parse_document(payload);

        document
            .select(&self.selectors.summary)
            .filter_map(|summary| self.extract_summary(summary))
            .collect()
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parses a displayed count such as `1,234`; anything else is unextractable
fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
