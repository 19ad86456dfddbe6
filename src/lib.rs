//! Stackwatch: an incremental listing watcher
//!
//! This crate polls a paginated question listing, extracts records from the
//! rendered markup, keeps a persisted high-water mark of the newest record
//! identifier it has delivered, and forwards only genuinely new records to a
//! display sink and an optional SQLite store.

pub mod config;
pub mod crawler;
pub mod notify;
pub mod output;
pub mod record;
pub mod state;
pub mod storage;
pub mod watcher;

use thiserror::Error;

/// Main error type for Stackwatch operations
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] state::StateError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Stackwatch operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::Record;
pub use state::WatermarkTracker;
pub use watcher::{Shutdown, Watcher};
