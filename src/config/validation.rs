use crate::candidates::CandidateSource;
use crate::config::region::region_endpoint;
use crate::config::types::ScanConfig;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &ScanConfig) -> Result<(), ConfigError> {
    validate_source(&config.source)?;
    validate_target(config)?;
    validate_limits(config)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the candidate source
fn validate_source(source: &CandidateSource) -> Result<(), ConfigError> {
    match source {
        CandidateSource::Keywords(seeds) => {
            if seeds.iter().all(|s| s.trim().is_empty()) {
                return Err(ConfigError::EmptySeeds(seeds.join(",")));
            }
        }
        CandidateSource::Wordlist(path) => {
            if !path.is_file() {
                return Err(ConfigError::WordlistNotFound(path.clone()));
            }
        }
    }
    Ok(())
}

/// Validates the region or custom endpoint
fn validate_target(config: &ScanConfig) -> Result<(), ConfigError> {
    match &config.endpoint {
        Some(endpoint) => {
            let url = Url::parse(endpoint)
                .map_err(|e| ConfigError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::InvalidEndpoint(format!(
                    "{} must use http or https",
                    endpoint
                )));
            }

            if url.host_str().is_none() {
                return Err(ConfigError::InvalidEndpoint(format!(
                    "{} has no host",
                    endpoint
                )));
            }
        }
        None => {
            if region_endpoint(&config.region).is_none() {
                return Err(ConfigError::UnknownRegion(config.region.clone()));
            }
        }
    }
    Ok(())
}

/// Validates numeric limits
fn validate_limits(config: &ScanConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    let timeout = config.timeout.as_secs();
    if timeout < 1 || timeout > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout must be between 1 and 300 seconds, got {}s",
            timeout
        )));
    }

    if config.max_redirect_depth < 1 || config.max_redirect_depth > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirect_depth must be between 1 and 20, got {}",
            config.max_redirect_depth
        )));
    }

    Ok(())
}
