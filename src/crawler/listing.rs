//! Listing page address construction

use crate::config::TargetConfig;
use crate::crawler::fetcher::UrlBuilder;
use crate::ConfigError;
use url::Url;

/// Builds the address template for a target's newest-first listing
///
/// The result is `{base}/questions/tagged/{label}?sort=newest&pageSize={n}`;
/// the label is encoded as a single path segment.
pub fn listing_url(target: &TargetConfig) -> Result<Url, ConfigError> {
    let mut url = Url::parse(&target.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| {
            ConfigError::InvalidUrl(format!("base-url '{}' cannot be a base", target.base_url))
        })?
        .pop_if_empty()
        .extend(["questions", "tagged", target.label.as_str()]);

    url.query_pairs_mut()
        .append_pair("sort", "newest")
        .append_pair("pageSize", &target.page_size.to_string());

    Ok(url)
}

/// Returns a page-index to address function for the fetcher
pub fn listing_url_builder(target: &TargetConfig) -> Result<UrlBuilder, ConfigError> {
    let template = listing_url(target)?;

    Ok(Box::new(move |page| {
        let mut url = template.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        url.to_string()
    }))
}

/// Extracts the numeric question identifier from a link path
///
/// Accepts both relative (`/questions/123/slug`) and absolute forms.
pub fn identifier_from_href(href: &str) -> Option<u64> {
    let mut segments = href
        .split(['?', '#'])
        .next()?
        .split('/')
        .filter(|s| !s.is_empty());

    segments.find(|s| *s == "questions")?;
    segments.next()?.parse().ok()
}
