//! Configuration module for Bucket Finder
//!
//! This module merges command-line settings with an optional TOML file,
//! validates the result and resolves the probe endpoint.
//!
//! # Example
//!
//! ```no_run
//! use bucket_finder::config::{resolve_config, ScanSection};
//! use bucket_finder::CandidateSource;
//! use std::path::Path;
//!
//! let source = CandidateSource::Keywords(vec!["acme".to_string()]);
//! let config = resolve_config(source, Some(Path::new("bucket-finder.toml")), ScanSection::default(), false).unwrap();
//! println!("Scanning with {} workers", config.workers);
//! ```

mod parser;
mod region;
mod types;
mod validation;

// Re-export types
pub use types::{
    FileConfig, ScanConfig, ScanSection, DEFAULT_MAX_REDIRECT_DEPTH, DEFAULT_REGION,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, DEFAULT_WORKERS,
};

// Re-export parser functions
pub use parser::{load_config, merge_sections, resolve_base_url, resolve_config};
pub use region::{region_endpoint, REGIONS};
pub use validation::validate;
