//! Region code to endpoint lookup

/// Known regions: (code, base URL)
///
/// us: US Standard, ie: Ireland, nc: Northern California, si: Singapore,
/// to: Tokyo.
pub const REGIONS: &[(&str, &str)] = &[
    ("us", "https://s3.amazonaws.com"),
    ("ie", "https://s3-eu-west-1.amazonaws.com"),
    ("nc", "https://s3-us-west-1.amazonaws.com"),
    ("si", "https://s3-ap-southeast-1.amazonaws.com"),
    ("to", "https://s3-ap-northeast-1.amazonaws.com"),
];

/// Returns the base URL for a region code, if known
pub fn region_endpoint(code: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code.trim()))
        .map(|(_, url)| *url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_regions() {
        assert_eq!(region_endpoint("us"), Some("https://s3.amazonaws.com"));
        assert_eq!(region_endpoint("ie"), Some("https://s3-eu-west-1.amazonaws.com"));
        assert_eq!(region_endpoint(" TO "), Some("https://s3-ap-northeast-1.amazonaws.com"));
    }

    #[test]
    fn test_unknown_region() {
        assert_eq!(region_endpoint("mars"), None);
        assert_eq!(region_endpoint(""), None);
    }
}
