use crate::candidates::CandidateSource;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default number of concurrent workers
pub const DEFAULT_WORKERS: usize = 10;

/// Default cap on followed redirects per candidate
pub const DEFAULT_MAX_REDIRECT_DEPTH: u32 = 5;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_REGION: &str = "us";

pub const DEFAULT_USER_AGENT: &str = concat!("bucket-finder/", env!("CARGO_PKG_VERSION"));

/// Top-level structure of a TOML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub scan: ScanSection,
}

/// Optional scan settings, as written in a config file or given on the CLI
///
/// Every field is optional so that layers can be merged; unset fields fall
/// back to the defaults above.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ScanSection {
    /// Region code resolved through the region table
    pub region: Option<String>,

    /// Base URL that replaces the region endpoint
    pub endpoint: Option<String>,

    /// Number of concurrent workers
    pub workers: Option<usize>,

    /// Delay before each probe, per worker (milliseconds)
    #[serde(rename = "rate-limit-ms")]
    pub rate_limit_ms: Option<u64>,

    /// Download readable objects instead of only checking them
    pub download: Option<bool>,

    /// Directory that receives downloaded objects
    #[serde(rename = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Append-only log of finding lines
    #[serde(rename = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Maximum number of redirects followed for one candidate
    #[serde(rename = "max-redirect-depth")]
    pub max_redirect_depth: Option<u32>,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with every probe
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

/// Fully resolved configuration of one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Keywords or wordlist
    pub source: CandidateSource,

    /// Region code; ignored when `endpoint` is set
    pub region: String,

    /// Custom base URL for S3-compatible providers
    pub endpoint: Option<String>,

    pub workers: usize,

    /// Explicit per-probe delay; derived from `workers` when unset
    pub rate_limit: Option<Duration>,

    pub download: bool,

    /// Verbose mode: worker prefixes and negative outcomes
    pub verbose: bool,

    pub output_dir: PathBuf,

    pub log_file: Option<PathBuf>,

    pub max_redirect_depth: u32,

    pub timeout: Duration,

    pub user_agent: String,
}

impl ScanConfig {
    /// Creates a configuration with default settings for `source`
    pub fn new(source: CandidateSource) -> Self {
        Self {
            source,
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            workers: DEFAULT_WORKERS,
            rate_limit: None,
            download: false,
            verbose: false,
            output_dir: PathBuf::from("."),
            log_file: None,
            max_redirect_depth: DEFAULT_MAX_REDIRECT_DEPTH,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Creates a configuration from merged optional settings
    pub fn from_section(source: CandidateSource, section: ScanSection) -> Self {
        let defaults = Self::new(source);

        Self {
            region: section.region.unwrap_or(defaults.region),
            endpoint: section.endpoint,
            workers: section.workers.unwrap_or(defaults.workers),
            rate_limit: section.rate_limit_ms.map(Duration::from_millis),
            download: section.download.unwrap_or(defaults.download),
            output_dir: section.output_dir.unwrap_or(defaults.output_dir),
            log_file: section.log_file,
            max_redirect_depth: section
                .max_redirect_depth
                .unwrap_or(defaults.max_redirect_depth),
            timeout: section
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            user_agent: section.user_agent.unwrap_or(defaults.user_agent),
            ..defaults
        }
    }

    /// Delay each worker sleeps before a probe
    ///
    /// Defaults to `1000 / workers` milliseconds.
    pub fn probe_delay(&self) -> Duration {
        self.rate_limit
            .unwrap_or_else(|| Duration::from_millis(1000 / self.workers.max(1) as u64))
    }
}
