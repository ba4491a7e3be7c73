//! Output module for scan findings and statistics
//!
//! This module handles:
//! - Writing finding lines to the console and an optional log file
//! - Capturing finding lines in memory for tests and embedding
//! - Counting scan outcomes and printing the end-of-run summary

mod sink;
pub mod stats;

pub use sink::{ConsoleSink, LogSink, MemorySink};
pub use stats::{print_summary, ScanEvent, ScanStats, ScanSummary};
