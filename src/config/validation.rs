use crate::config::types::{Config, FetchConfig, OutputConfig, TargetConfig, WatchConfig};
use crate::crawler::MAX_PAGE_CEILING;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_watch_config(&config.watch)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the watched target
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    validate_label(&config.label)?;

    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' cannot be used as a base",
            config.base_url
        )));
    }

    if config.page_size < 1 || config.page_size > 100 {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and 100, got {}",
            config.page_size
        )));
    }

    Ok(())
}

/// Validates poll loop settings
fn validate_watch_config(config: &WatchConfig) -> Result<(), ConfigError> {
    if config.interval_secs < 1 {
        return Err(ConfigError::Validation(
            "interval-secs must be >= 1".to_string(),
        ));
    }

    if config.fetch_limit < 1 {
        return Err(ConfigError::Validation(
            "fetch-limit must be >= 1".to_string(),
        ));
    }

    if let Some(path) = &config.state_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "state-path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates fetch settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.retries < 1 || config.retries > 10 {
        return Err(ConfigError::Validation(format!(
            "retries must be between 1 and 10, got {}",
            config.retries
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_pages < 1 || config.max_pages > MAX_PAGE_CEILING {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between 1 and {}, got {}",
            MAX_PAGE_CEILING, config.max_pages
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.database_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database-path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates a target label
///
/// Labels become a URL path segment and part of the default state file
/// name, so only tag-like characters are accepted.
fn validate_label(label: &str) -> Result<(), ConfigError> {
    if label.is_empty() {
        return Err(ConfigError::Validation(
            "target label cannot be empty".to_string(),
        ));
    }

    if !label
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '+' | '#' | '_'))
    {
        return Err(ConfigError::Validation(format!(
            "target label '{}' contains invalid characters",
            label
        )));
    }

    Ok(())
}
