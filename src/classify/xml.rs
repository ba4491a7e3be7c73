//! Minimal extraction of the two provider XML documents
//!
//! Only the handful of fields the classifier needs are pulled out. The root
//! element decides the document type, the same way a typed unmarshal would.

use super::ObjectEntry;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// Compiled once; a failed compile degrades to "unrecognized" rather than panicking
static ROOT_ELEMENT: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?s)^(?:\s*<\?.*?\?>|\s*<!--.*?-->|\s*<!DOCTYPE[^>]*>)*\s*<([A-Za-z_][\w.\-]*)").ok()
});

static CONTENTS_BLOCK: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?s)<Contents>(.*?)</Contents>").ok());

static ENTITY: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|amp|lt|gt|quot|apos);").ok());

/// Fields of a `ListBucketResult` document
#[derive(Debug, Default)]
pub(super) struct ListBucketResult {
    pub name: String,
    pub objects: Vec<ObjectEntry>,
}

/// Fields of an `Error` document
#[derive(Debug, Default)]
pub(super) struct ErrorDocument {
    pub code: String,
    pub message: String,
    pub endpoint: Option<String>,
}

/// Parses `doc` if its root element is `ListBucketResult`
pub(super) fn parse_listing(doc: &str) -> Option<ListBucketResult> {
    if root_element(doc)? != "ListBucketResult" || !doc.contains("</ListBucketResult>") {
        return None;
    }

    let contents = CONTENTS_BLOCK.as_ref()?;

    let objects = contents
        .captures_iter(doc)
        .filter_map(|caps| {
            let block = caps.get(1)?.as_str();
            Some(ObjectEntry {
                key: element_verbatim(block, "Key")?,
                size: element_text(block, "Size")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
                last_modified: element_text(block, "LastModified").unwrap_or_default(),
            })
        })
        .collect();

    // Contents never carry a <Name>, but stripping them keeps the lookup top-level
    let outer = contents.replace_all(doc, "");
    let name = element_text(&outer, "Name").unwrap_or_default();

    Some(ListBucketResult { name, objects })
}

/// Parses `doc` if its root element is `Error`
pub(super) fn parse_error(doc: &str) -> Option<ErrorDocument> {
    if root_element(doc)? != "Error" || !doc.contains("</Error>") {
        return None;
    }

    Some(ErrorDocument {
        code: element_text(doc, "Code").unwrap_or_default(),
        message: element_text(doc, "Message").unwrap_or_default(),
        endpoint: element_text(doc, "Endpoint"),
    })
}

fn root_element(doc: &str) -> Option<&str> {
    let doc = doc.trim_start_matches('\u{feff}');
    let caps = ROOT_ELEMENT.as_ref()?.captures(doc)?;
    caps.get(1).map(|m| m.as_str())
}

/// Returns the decoded, trimmed text of the first `<tag>...</tag>` in `doc`
fn element_text(doc: &str, tag: &str) -> Option<String> {
    element_raw(doc, tag).map(|raw| unescape(raw.trim()))
}

/// Like [`element_text`] but keeps surrounding whitespace
///
/// Object keys may legally begin or end with spaces.
fn element_verbatim(doc: &str, tag: &str) -> Option<String> {
    element_raw(doc, tag).map(unescape)
}

fn element_raw<'a>(doc: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);

    let start = doc.find(&open)? + open.len();
    let end = start + doc[start..].find(&close)?;

    Some(&doc[start..end])
}

/// Decodes the predefined XML entities and numeric character references
fn unescape(text: &str) -> String {
    let Some(entity) = ENTITY.as_ref() else {
        return text.to_string();
    };

    entity
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            match name {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = match name.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => name[1..].parse().ok(),
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| caps[0].to_string())
                }
            }
        })
        .into_owned()
}
