//! Output module for presenting delivered records
//!
//! This module handles:
//! - Rendering each batch of new records for the operator
//! - Reporting what the record store holds

mod display;
pub mod stats;

pub use display::{format_records, ConsoleDisplay, DisplaySink};
pub use stats::{load_statistics, print_statistics, StoreStatistics};
