//! Keyword permutation engine
//!
//! Expands a handful of seed keywords into the set of bucket names worth
//! probing. Every table below is fixed, so the output for a single seed is
//! bounded by a constant no matter how long the seed is, and multiple seeds
//! only add pairwise cross combinations.
//!
//! Year variants depend on the wall-clock year at generation time, so the
//! output changes across calendar years but is otherwise deterministic.

use super::validation::is_valid_bucket_name;
use chrono::Datelike;
use std::collections::BTreeSet;

/// Suffixes appended with a hyphen separator
const SUFFIXES: &[&str] = &[
    "", "-backup", "-backups", "-data", "-files", "-assets", "-logs", "-uploads", "-staging",
    "-prod", "-production", "-dev", "-development", "-test", "-testing", "-config", "-archive",
    "-static", "-media", "-storage", "-bucket", "-s3", "-web", "-www", "-api", "-app", "-db",
    "-old", "-new",
];

/// Prefixes prepended with a hyphen separator
const PREFIXES: &[&str] = &[
    "backup-", "data-", "files-", "assets-", "logs-", "uploads-", "staging-", "prod-",
    "production-", "dev-", "test-", "config-", "archive-", "static-", "media-", "storage-",
    "s3-", "web-", "www-", "api-", "app-", "db-",
];

/// Terms glued on without a separator, on either side
const CONCAT_TERMS: &[&str] = &[
    "backup", "backups", "data", "files", "assets", "logs", "prod", "dev", "staging", "test",
    "static", "media", "api", "web",
];

/// `<prefix>-<seed>-<suffix>` patterns
const DOUBLE_PREFIXES: &[&str] = &["backup", "prod", "staging", "dev", "test"];
const DOUBLE_SUFFIXES: &[&str] = &["prod", "staging", "dev", "backup", "data"];

const NUMERIC_SUFFIXES: &[&str] = &["1", "2", "3", "-1", "-2", "-3", "01", "02"];

/// Terms combined with the first label of a domain-like seed
const DOMAIN_TERMS: &[&str] = &["dev", "test", "staging", "prod", "www", "api"];

/// Number of preceding years combined with each seed
const YEAR_SPAN: i32 = 2;

/// Environment terms appended to pairwise seed combinations
pub const CROSS_TERMS: &[&str] = &["prod", "staging", "backup"];

/// Accumulates validated, deduplicated candidate names
#[derive(Debug, Default)]
struct Permutations {
    names: BTreeSet<String>,
}

impl Permutations {
    fn add(&mut self, name: impl Into<String>) {
        let name = name.into();
        if is_valid_bucket_name(&name) {
            self.names.insert(name);
        }
    }

    fn into_set(self) -> BTreeSet<String> {
        self.names
    }
}

/// Generates candidate names for the current calendar year
///
/// # Arguments
///
/// * `seeds` - Seed keywords; each is lowercased and trimmed
///
/// # Returns
///
/// The deduplicated set of valid candidate names
///
/// # Examples
///
/// ```
/// use bucket_finder::generate;
///
/// let names = generate(&["acme".to_string()]);
/// assert!(names.contains("acme-backup"));
/// assert!(names.contains("backup-acme"));
/// ```
pub fn generate(seeds: &[String]) -> BTreeSet<String> {
    generate_for_year(seeds, chrono::Local::now().year())
}

/// Generates candidate names using `year` as the current year
pub fn generate_for_year(seeds: &[String], year: i32) -> BTreeSet<String> {
    let mut perms = Permutations::default();

    let seeds: Vec<String> = seeds
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let mut bases: Vec<String> = Vec::with_capacity(seeds.len());

    for seed in &seeds {
        let base = base_name(seed);

        perms.add(seed.as_str());
        expand_name(&mut perms, seed, year);

        if base != seed.as_str() {
            perms.add(base);
            expand_name(&mut perms, base, year);
        }

        if seed.contains('.') {
            domain_permutations(&mut perms, seed);
        }

        if !bases.iter().any(|b| b == base) {
            bases.push(base.to_string());
        }
    }

    // Pairwise only: a full cartesian product would grow exponentially
    for (i, first) in bases.iter().enumerate() {
        for second in &bases[i + 1..] {
            cross_permutations(&mut perms, first, second);
        }
    }

    perms.into_set()
}

/// Extracts the base name of a compound or domain-like seed
///
/// `"example.com"` becomes `"example"`, `"acme-corp"` becomes `"acme"`. The
/// first segment is only used when it is longer than two characters.
fn base_name(seed: &str) -> &str {
    match seed.split(['.', '-', '_', ' ']).next() {
        Some(first) if first.len() > 2 && first.len() < seed.len() => first,
        _ => seed,
    }
}

/// Per-name expansion shared by seeds and their base names
fn expand_name(perms: &mut Permutations, name: &str, year: i32) {
    for suffix in SUFFIXES {
        let candidate = format!("{}{}", name, suffix);
        if candidate.contains('-') {
            perms.add(candidate.replace('-', ""));
        }
        perms.add(candidate);
    }

    for prefix in PREFIXES {
        let candidate = format!("{}{}", prefix, name);
        perms.add(candidate.replace('-', ""));
        perms.add(candidate);
    }

    for term in CONCAT_TERMS {
        perms.add(format!("{}{}", name, term));
        perms.add(format!("{}{}", term, name));
    }

    for prefix in DOUBLE_PREFIXES {
        for suffix in DOUBLE_SUFFIXES {
            if prefix != suffix {
                perms.add(format!("{}-{}-{}", prefix, name, suffix));
            }
        }
    }

    for number in NUMERIC_SUFFIXES {
        perms.add(format!("{}{}", name, number));
    }

    for y in (year - YEAR_SPAN)..=year {
        perms.add(format!("{}{}", name, y));
        perms.add(format!("{}-{}", name, y));
    }
}

fn domain_permutations(perms: &mut Permutations, seed: &str) {
    let mut labels = seed.split('.');
    let domain = match (labels.next(), labels.next()) {
        (Some(domain), Some(_)) if !domain.is_empty() => domain,
        _ => return,
    };

    for term in DOMAIN_TERMS {
        perms.add(format!("{}-{}", domain, term));
        perms.add(format!("{}-{}", term, domain));
    }
}

fn cross_permutations(perms: &mut Permutations, first: &str, second: &str) {
    for (a, b) in [(first, second), (second, first)] {
        perms.add(format!("{}-{}", a, b));
        for term in CROSS_TERMS {
            perms.add(format!("{}-{}-{}", a, b, term));
        }
    }
}
