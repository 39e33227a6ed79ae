//! YAML front matter extraction and parsing.
//!
//! Metadata can arrive two ways: a sibling `.yml`/`.yaml` file next to the
//! post, or an inline block at the top of the content delimited by `---`
//! lines:
//!
//! ```text
//! ---
//! title: Hello World
//! tags: [rust, blog]
//! published: false
//! ---
//! Body starts here.
//! ```
//!
//! The inline block is stripped from the body whether or not it parses;
//! unparseable YAML is reported as `ParseError::InvalidFormat` and treated
//! by the caller as absent metadata.

use super::ParseError;
use serde::Deserialize;

/// Delimiter line opening and closing an inline metadata block.
const DELIMITER: &str = "---";

/// Raw front matter fields, all optional.
///
/// Unknown keys are ignored so posts can carry extra metadata for other
/// consumers. Timestamps stay strings here; the parser resolves them
/// against the commit info.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
    pub author: Option<String>,

    /// Creation time override, `YYYY-MM-DD` or RFC 3339
    #[serde(alias = "date")]
    pub created_at: Option<String>,

    /// Update time override, `YYYY-MM-DD` or RFC 3339
    #[serde(alias = "updated")]
    pub updated_at: Option<String>,

    #[serde(alias = "image")]
    pub title_image: Option<String>,
}

/// Parse front matter bytes as YAML.
pub fn parse(bytes: &[u8]) -> Result<FrontMatter, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(ParseError::MalformedDocument)?;
    // An empty block is valid and carries no fields
    if text.trim().is_empty() {
        return Ok(FrontMatter::default());
    }
    serde_yaml_ng::from_str(text).map_err(ParseError::InvalidFormat)
}

/// Split an inline `---`-delimited metadata block off the top of `text`.
///
/// Returns `(block, body)` where `block` is the YAML between the delimiters
/// and `body` is everything after the closing delimiter line. Returns
/// `None` when the text does not open with a delimiter line or the block
/// is never closed.
pub fn split_inline(text: &str) -> Option<(&str, &str)> {
    let rest = strip_delimiter_line(text)?;

    // Find the closing delimiter at the start of a line
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((block, body));
        }
        offset += line.len();
    }

    None
}

/// Strip a leading `---` line, tolerating a trailing `\r`.
fn strip_delimiter_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(DELIMITER)?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    rest.strip_prefix('\n')
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_inline_basic() {
        let text = "---\ntitle: Hello\n---\nBody here.\n";
        let (block, body) = split_inline(text).unwrap();
        assert_eq!(block, "title: Hello\n");
        assert_eq!(body, "Body here.\n");
    }

    #[test]
    fn test_split_inline_crlf() {
        let text = "---\r\ntitle: Hello\r\n---\r\nBody here.\r\n";
        let (block, body) = split_inline(text).unwrap();
        assert_eq!(block, "title: Hello\r\n");
        assert_eq!(body, "Body here.\r\n");
    }

    #[test]
    fn test_split_inline_no_block() {
        assert!(split_inline("# Just a heading\n").is_none());
    }

    #[test]
    fn test_split_inline_unclosed() {
        assert!(split_inline("---\ntitle: Hello\nno closing\n").is_none());
    }

    #[test]
    fn test_split_inline_not_at_start() {
        assert!(split_inline("\n---\ntitle: x\n---\n").is_none());
    }

    #[test]
    fn test_split_inline_empty_block() {
        let (block, body) = split_inline("---\n---\nBody\n").unwrap();
        assert_eq!(block, "");
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_split_inline_closing_at_eof() {
        let (block, body) = split_inline("---\ntitle: x\n---").unwrap();
        assert_eq!(block, "title: x\n");
        assert_eq!(body, "");
    }

    #[test]
    fn test_parse_full() {
        let yaml = b"title: Hello\ncategory: rust\ntags: [a, b]\npublished: false\nauthor: Alice\ndate: 2024-06-15\nimage: cover.png\n";
        let fm = parse(yaml).unwrap();

        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.category.as_deref(), Some("rust"));
        assert_eq!(fm.tags, Some(vec!["a".into(), "b".into()]));
        assert_eq!(fm.published, Some(false));
        assert_eq!(fm.author.as_deref(), Some("Alice"));
        assert_eq!(fm.created_at.as_deref(), Some("2024-06-15"));
        assert_eq!(fm.title_image.as_deref(), Some("cover.png"));
    }

    #[test]
    fn test_parse_empty_is_default() {
        let fm = parse(b"").unwrap();
        assert!(fm.title.is_none());
        assert!(fm.published.is_none());
    }

    #[test]
    fn test_parse_unknown_keys_ignored() {
        let fm = parse(b"title: Hi\nlayout: wide\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = parse(b"title: [unclosed\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));
    }

    #[test]
    fn test_parse_date_alias() {
        let fm = parse(b"created_at: 2024-01-01\n").unwrap();
        assert_eq!(fm.created_at.as_deref(), Some("2024-01-01"));
    }
}
