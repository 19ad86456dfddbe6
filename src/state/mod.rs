//! State module for tracking watch progress
//!
//! This module provides the persisted high-water mark that separates records
//! already delivered from records that are new.
//!
//! # Components
//!
//! - `WatermarkTracker`: Loads, filters against, advances, and persists the watermark
//! - `LoadOutcome`: Records whether the watermark came from disk or a fallback

mod watermark;

pub use watermark::{LoadOutcome, WatermarkTracker};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving or clearing the watermark
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to persist watermark to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to reset watermark at {path}: {source}")]
    Reset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
