use crate::candidates::CandidateSource;
use crate::config::region::region_endpoint;
use crate::config::types::{FileConfig, ScanConfig, ScanSection};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(FileConfig)` - Successfully loaded configuration
/// * `Err(ConfigError)` - Failed to read or parse the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use bucket_finder::config::load_config;
///
/// let file = load_config(Path::new("bucket-finder.toml")).unwrap();
/// println!("Workers: {:?}", file.scan.workers);
/// ```
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Layers `overrides` on top of `base`; set fields in `overrides` win
pub fn merge_sections(base: ScanSection, overrides: ScanSection) -> ScanSection {
    ScanSection {
        region: overrides.region.or(base.region),
        endpoint: overrides.endpoint.or(base.endpoint),
        workers: overrides.workers.or(base.workers),
        rate_limit_ms: overrides.rate_limit_ms.or(base.rate_limit_ms),
        download: overrides.download.or(base.download),
        output_dir: overrides.output_dir.or(base.output_dir),
        log_file: overrides.log_file.or(base.log_file),
        max_redirect_depth: overrides.max_redirect_depth.or(base.max_redirect_depth),
        timeout_secs: overrides.timeout_secs.or(base.timeout_secs),
        user_agent: overrides.user_agent.or(base.user_agent),
    }
}

/// Builds and validates the scan configuration
///
/// Precedence is CLI flags, then the config file (if any), then defaults.
///
/// # Arguments
///
/// * `source` - The candidate source chosen on the command line
/// * `config_path` - Optional TOML file
/// * `cli` - Settings given as command-line flags
/// * `verbose` - Whether verbose mode is on
pub fn resolve_config(
    source: CandidateSource,
    config_path: Option<&Path>,
    cli: ScanSection,
    verbose: bool,
) -> Result<ScanConfig, ConfigError> {
    let file = match config_path {
        Some(path) => load_config(path)?.scan,
        None => ScanSection::default(),
    };

    let mut config = ScanConfig::from_section(source, merge_sections(file, cli));
    config.verbose = verbose;

    validate(&config)?;
    Ok(config)
}

/// Returns the base URL probes are sent to
///
/// A custom endpoint wins over the region table. Trailing slashes are
/// removed so paths can be appended with a single `/`.
pub fn resolve_base_url(config: &ScanConfig) -> Result<String, ConfigError> {
    let base = match &config.endpoint {
        Some(endpoint) => endpoint.as_str(),
        None => region_endpoint(&config.region)
            .ok_or_else(|| ConfigError::UnknownRegion(config.region.clone()))?,
    };

    Ok(base.trim_end_matches('/').to_string())
}
