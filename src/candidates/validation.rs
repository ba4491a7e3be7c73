//! Bucket name validation
//!
//! Names are 3 to 63 characters of `[a-z0-9.-]` and may not start or end
//! with `-` or `.`.

/// Shortest name the provider accepts
pub const MIN_NAME_LEN: usize = 3;

/// Longest name the provider accepts
pub const MAX_NAME_LEN: usize = 63;

/// Returns true if `name` is a syntactically valid bucket name
///
/// # Examples
///
/// ```
/// use bucket_finder::is_valid_bucket_name;
///
/// assert!(is_valid_bucket_name("acme-backup"));
/// assert!(!is_valid_bucket_name("-acme"));
/// assert!(!is_valid_bucket_name("Acme"));
/// ```
pub fn is_valid_bucket_name(name: &str) -> bool {
    if name.len() < MIN_NAME_LEN || name.len() > MAX_NAME_LEN {
        return false;
    }

    if name.starts_with('-') || name.ends_with('-') {
        return false;
    }

    if name.starts_with('.') || name.ends_with('.') {
        return false;
    }

    name.bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
}
