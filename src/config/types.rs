use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default listing host
pub const DEFAULT_BASE_URL: &str = "https://stackoverflow.com";

/// Default browser-like user agent sent with every listing request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Stackwatch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub target: TargetConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Location of the watermark file for this target
    pub fn state_path(&self) -> PathBuf {
        match &self.watch.state_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(format!("last_seen_id_{}.txt", self.target.label)),
        }
    }

    /// Time between poll cycles
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.watch.interval_secs)
    }
}

/// The listing being watched
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Tag or topic label (e.g. "python")
    pub label: String,

    /// Scheme and host of the listing site
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Items requested per listing page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,
}

/// Poll loop behavior
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Seconds to sleep between cycles
    #[serde(rename = "interval-secs", default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Maximum candidates collected per cycle
    #[serde(rename = "fetch-limit", default = "default_fetch_limit")]
    pub fetch_limit: usize,

    /// Stop paginating at the first already-seen record
    #[serde(rename = "early-stop", default)]
    pub early_stop: bool,

    /// Swallow the existing listing on the very first run
    #[serde(rename = "skip-backlog", default)]
    pub skip_backlog: bool,

    /// Watermark file; derived from the label when absent
    #[serde(rename = "state-path", default)]
    pub state_path: Option<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            fetch_limit: default_fetch_limit(),
            early_stop: false,
            skip_backlog: false,
            state_path: None,
        }
    }
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Attempts per page, including the first
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fixed delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Page index ceiling for one collection pass
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// User-Agent header value
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
            user_agent: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file; no persistence when absent
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_interval_secs() -> u64 {
    60
}

fn default_fetch_limit() -> usize {
    50
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_pages() -> u32 {
    100
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
