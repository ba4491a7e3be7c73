//! Candidate sources: keyword strings and wordlist files

use crate::{ConfigError, FinderError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Where the candidate names of a scan come from
///
/// Keywords and a wordlist are mutually exclusive; exactly one is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// Seed keywords expanded by the permutation engine
    Keywords(Vec<String>),
    /// A file with one bucket name per line, probed as-is
    Wordlist(PathBuf),
}

impl CandidateSource {
    /// Builds a source from the two optional user inputs
    ///
    /// # Returns
    ///
    /// * `Ok(CandidateSource)` - Exactly one input was supplied
    /// * `Err(ConfigError)` - Neither or both were supplied, or the keyword
    ///   string contained no usable seeds
    pub fn from_inputs(
        keyword: Option<&str>,
        wordlist: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        match (keyword, wordlist) {
            (None, None) => Err(ConfigError::MissingSource),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingSources),
            (Some(raw), None) => {
                let seeds = parse_seed_keywords(raw);
                if seeds.is_empty() {
                    return Err(ConfigError::EmptySeeds(raw.to_string()));
                }
                Ok(Self::Keywords(seeds))
            }
            (None, Some(path)) => Ok(Self::Wordlist(path.to_path_buf())),
        }
    }
}

/// Splits a raw keyword argument into seeds
///
/// Splits on commas when any are present, otherwise on whitespace. Seeds are
/// trimmed and lowercased; empty entries are dropped.
pub fn parse_seed_keywords(raw: &str) -> Vec<String> {
    let parts: Vec<&str> = if raw.contains(',') {
        raw.split(',').collect()
    } else {
        raw.split_whitespace().collect()
    };

    parts
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Loads bucket names from a wordlist file
///
/// One name per line; lines are trimmed and blank lines skipped.
pub fn load_wordlist(path: &Path) -> Result<Vec<String>, FinderError> {
    let wordlist_error = |source| FinderError::Wordlist {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(wordlist_error)?;
    let mut names = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line.map_err(wordlist_error)?;
        let name = line.trim();
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }

    Ok(names)
}
