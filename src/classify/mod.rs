//! Provider response classification
//!
//! Storage providers answer a bucket probe with one of two XML documents: a
//! `ListBucketResult` when the bucket is publicly listable, or an `Error`
//! document naming why it is not. This module turns the raw body into a
//! [`Classification`] without interpreting what the outcome means for the
//! scan; that policy lives in the walker.

mod xml;

use std::fmt;

/// A single object entry from a bucket listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Object key, with XML entities decoded
    pub key: String,

    /// Object size in bytes (0 when absent or unparseable)
    pub size: u64,

    /// Last-modified timestamp as reported by the provider
    pub last_modified: String,
}

impl ObjectEntry {
    /// Returns true if this entry is a directory marker (key ends in `/`)
    pub fn is_directory_marker(&self) -> bool {
        self.key.ends_with('/')
    }
}

/// Error codes the scanner has a dedicated policy for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The bucket exists but the requested key does not
    NoSuchKey,
    /// The bucket exists but cannot be listed anonymously
    AccessDenied,
    /// No bucket by that name exists
    NoSuchBucket,
    /// The bucket lives behind a different regional endpoint
    PermanentRedirect,
    /// Any other code, kept verbatim
    Other(String),
}

impl ProviderErrorCode {
    /// Maps a raw `<Code>` value onto a known code
    pub fn parse(code: &str) -> Self {
        match code {
            "NoSuchKey" => Self::NoSuchKey,
            "AccessDenied" => Self::AccessDenied,
            "NoSuchBucket" => Self::NoSuchBucket,
            "PermanentRedirect" => Self::PermanentRedirect,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the code as the provider spells it
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSuchKey => "NoSuchKey",
            Self::AccessDenied => "AccessDenied",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::PermanentRedirect => "PermanentRedirect",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a provider response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The bucket is listable; an empty object list is still a finding
    Listing {
        bucket: String,
        objects: Vec<ObjectEntry>,
    },

    /// The provider returned an error document
    ProviderError {
        code: ProviderErrorCode,
        message: String,
        /// Endpoint to retry against, present on redirects
        endpoint: Option<String>,
    },

    /// The body is neither a listing nor an error document
    Unrecognized,
}

/// Classifies a raw response body
///
/// A listing is recognized only if it carries a non-empty bucket name, and
/// an error document only if it carries a non-empty code. Anything else is
/// [`Classification::Unrecognized`].
///
/// # Examples
///
/// ```
/// use bucket_finder::{classify, Classification, ProviderErrorCode};
///
/// let body = b"<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>";
/// match classify(body) {
///     Classification::ProviderError { code, .. } => {
///         assert_eq!(code, ProviderErrorCode::AccessDenied)
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub fn classify(body: &[u8]) -> Classification {
    let text = String::from_utf8_lossy(body);

    if let Some(listing) = xml::parse_listing(&text) {
        if !listing.name.is_empty() {
            return Classification::Listing {
                bucket: listing.name,
                objects: listing.objects,
            };
        }
    }

    if let Some(error) = xml::parse_error(&text) {
        if !error.code.is_empty() {
            return Classification::ProviderError {
                code: ProviderErrorCode::parse(&error.code),
                message: error.message,
                endpoint: error.endpoint.filter(|e| !e.is_empty()),
            };
        }
    }

    Classification::Unrecognized
}
