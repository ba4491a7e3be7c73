//! Candidate bucket names
//!
//! This module turns user input into the work queue for a scan:
//! - Expanding seed keywords into a bounded permutation set
//! - Validating names against the provider's naming rules
//! - Parsing keyword strings and loading wordlist files

mod generator;
mod source;
mod validation;

pub use generator::{generate, generate_for_year, CROSS_TERMS};
pub use source::{load_wordlist, parse_seed_keywords, CandidateSource};
pub use validation::{is_valid_bucket_name, MAX_NAME_LEN, MIN_NAME_LEN};
