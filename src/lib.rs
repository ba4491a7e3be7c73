//! Bucket Finder: a public object-storage bucket auditor
//!
//! This crate expands seed keywords into candidate bucket names, probes each
//! candidate against a storage provider's public endpoint, classifies the
//! provider's answer and walks into any bucket that turns out to be listable.

pub mod candidates;
pub mod classify;
pub mod config;
pub mod output;
pub mod probe;
pub mod scanner;
pub mod walker;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Bucket Finder operations
#[derive(Debug, Error)]
pub enum FinderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read wordlist {path}: {source}")]
    Wordlist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
///
/// All of these are reported before any probing starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing wordlist or keyword")]
    MissingSource,

    #[error("Cannot specify both wordlist and keyword, choose one")]
    ConflictingSources,

    #[error("No usable seed keywords in {0:?}")]
    EmptySeeds(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Wordlist file doesn't exist: {}", .0.display())]
    WordlistNotFound(PathBuf),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Result type alias for Bucket Finder operations
pub type Result<T> = std::result::Result<T, FinderError>;

// Re-export commonly used types
pub use candidates::{generate, is_valid_bucket_name, CandidateSource};
pub use classify::{classify, Classification, ObjectEntry, ProviderErrorCode};
pub use config::ScanConfig;
pub use scanner::{run_scan, Scanner};
