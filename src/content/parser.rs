//! Document parser: raw bytes in, structured [`Document`] out.
//!
//! Pure transformation; all I/O (reading files, asking git for commit
//! times) happens in the caller and arrives here as plain values.
//!
//! # Title resolution
//!
//! First match wins:
//!
//! | Tier | Source                                   | Example              |
//! |------|------------------------------------------|----------------------|
//! | 1    | metadata block (sibling file or inline)  | `title: Hello World` |
//! | 2    | leading `# Heading` line                 | `# Hello World`      |
//! | 3    | humanized file stem                      | `hello-world.md`     |
//!
//! A leading heading line is stripped from the body whenever the title was
//! resolved by tier 1 or 2, so the rendered HTML never repeats the title.

use super::front_matter::{self, FrontMatter};
use super::{Document, ParseError, PostMeta, markdown};
use crate::source::CommitInfo;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeSet;
use std::path::Path;

// ============================================================================
// Entry Point
// ============================================================================

/// Parse one file into a [`Document`].
///
/// * `file_name` - repo-relative path; the stem becomes the identity
/// * `raw` - the file's bytes
/// * `meta` - sibling metadata file bytes, when one exists
/// * `info` - commit metadata, `None` when the file has no history yet
pub fn parse(
    file_name: &Path,
    raw: &[u8],
    meta: Option<&[u8]>,
    info: Option<CommitInfo>,
) -> Result<Document, ParseError> {
    let text = std::str::from_utf8(raw).map_err(ParseError::MalformedDocument)?;
    let slug = identity_of(file_name);

    // Tier 1: sibling metadata file wins over an inline block. Either way
    // an inline block is stripped from the body, and YAML that fails to
    // parse falls through to tiers 2/3 instead of aborting the file.
    let (inline_block, body) = match front_matter::split_inline(text) {
        Some((block, body)) => (Some(block), body),
        None => (None, text),
    };
    let front: FrontMatter = meta
        .map(front_matter::parse)
        .or_else(|| inline_block.map(|b| front_matter::parse(b.as_bytes())))
        .and_then(Result::ok)
        .unwrap_or_default();

    // Tier 2: a leading heading line is consumed even when tier 1 already
    // resolved the title, so the body never repeats it.
    let (heading, body) = strip_heading(body);

    let title = front
        .title
        .clone()
        .or_else(|| heading.map(str::to_owned))
        .unwrap_or_else(|| humanize(&slug));

    // Timestamps and author come from the commit history, overridable by
    // front matter; an unversioned file falls back to "now" and no author.
    let (created_at, updated_at, author) = match info {
        Some(info) => (info.created_at, info.updated_at, info.author),
        None => {
            let now = Utc::now();
            (now, now, String::new())
        }
    };
    let created_at = front
        .created_at
        .as_deref()
        .and_then(parse_datetime)
        .unwrap_or(created_at);
    let updated_at = front
        .updated_at
        .as_deref()
        .and_then(parse_datetime)
        .unwrap_or(updated_at);
    let author = front.author.clone().unwrap_or(author);

    let meta = PostMeta {
        title,
        category: front.category,
        tags: front.tags.map(BTreeSet::from_iter).unwrap_or_default(),
        published: front.published.unwrap_or(true),
        author,
        created_at,
        updated_at,
        title_image: front.title_image,
    };

    Ok(Document {
        slug,
        path: file_name.to_path_buf(),
        raw: text.to_owned(),
        rendered: markdown::render(body),
        meta,
    })
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Document identity: the file stem.
pub fn identity_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Take a leading `# Heading` line off the body.
///
/// Blank lines before the heading (left behind by front matter stripping)
/// are skipped. Returns the heading text and the remaining body.
fn strip_heading(body: &str) -> (Option<&str>, &str) {
    let trimmed = body.trim_start_matches(['\r', '\n']);

    let Some(rest) = trimmed.strip_prefix('#') else {
        return (None, body);
    };
    // "# Title" only - "## Section" and "#hashtag" are body content
    let Some(rest) = rest.strip_prefix(' ') else {
        return (None, body);
    };

    let (line, remainder) = match rest.split_once('\n') {
        Some((line, remainder)) => (line, remainder),
        None => (rest, ""),
    };
    let title = line.trim_end_matches('\r').trim();
    if title.is_empty() {
        return (None, body);
    }

    (Some(title), remainder)
}

/// Humanize a file stem: separators become spaces, words are title-cased.
///
/// `"my-first_post"` → `"My First Post"`
fn humanize(stem: &str) -> String {
    stem.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a front matter timestamp: RFC 3339, `YYYY-MM-DD HH:MM:SS`, or
/// bare `YYYY-MM-DD` (midnight UTC).
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn info() -> CommitInfo {
        CommitInfo {
            created_at: Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 2, 20, 9, 30, 0).unwrap(),
            author: "alice".into(),
        }
    }

    // ------------------------------------------------------------------------
    // Title resolution tiers
    // ------------------------------------------------------------------------

    #[test]
    fn test_title_from_front_matter() {
        let raw = b"---\ntitle: Overridden Title\n---\n# Ignored Heading\nBody.\n";
        let doc = parse(Path::new("content/en/b.md"), raw, None, Some(info())).unwrap();

        assert_eq!(doc.meta.title, "Overridden Title");
        // Heading consumed, not rendered
        assert!(!doc.rendered.contains("Ignored Heading"));
        assert!(doc.rendered.contains("Body."));
    }

    #[test]
    fn test_title_from_heading() {
        let raw = b"# Heading Title\nBody text.\n";
        let doc = parse(Path::new("content/en/a.md"), raw, None, Some(info())).unwrap();

        assert_eq!(doc.meta.title, "Heading Title");
        assert!(!doc.rendered.contains("<h1>"));
        assert!(doc.rendered.contains("Body text."));
    }

    #[test]
    fn test_title_from_filename() {
        let raw = b"No heading here, just text.\n";
        let doc = parse(Path::new("content/en/my-post.md"), raw, None, Some(info())).unwrap();

        assert_eq!(doc.meta.title, "My Post");
        assert!(doc.rendered.contains("No heading here"));
    }

    #[test]
    fn test_sibling_meta_beats_inline() {
        let raw = b"---\ntitle: Inline\n---\nBody.\n";
        let meta = b"title: Sibling\n";
        let doc = parse(Path::new("a.md"), raw, Some(meta), Some(info())).unwrap();

        assert_eq!(doc.meta.title, "Sibling");
    }

    // ------------------------------------------------------------------------
    // Metadata fields
    // ------------------------------------------------------------------------

    #[test]
    fn test_defaults_without_metadata() {
        let doc = parse(Path::new("a.md"), b"# T\nx\n", None, Some(info())).unwrap();

        assert!(doc.meta.published);
        assert!(doc.meta.tags.is_empty());
        assert!(doc.meta.category.is_none());
        assert!(doc.meta.title_image.is_none());
        assert_eq!(doc.meta.author, "alice");
    }

    #[test]
    fn test_metadata_fields_resolved() {
        let raw = b"---\ntitle: T\ncategory: rust\ntags: [b, a, b]\npublished: false\nimage: cover.png\n---\nBody.\n";
        let doc = parse(Path::new("a.md"), raw, None, Some(info())).unwrap();

        assert_eq!(doc.meta.category.as_deref(), Some("rust"));
        // Tag order is irrelevant and duplicates collapse
        assert_eq!(
            doc.meta.tags,
            BTreeSet::from(["a".to_string(), "b".to_string()])
        );
        assert!(!doc.meta.published);
        assert_eq!(doc.meta.title_image.as_deref(), Some("cover.png"));
    }

    #[test]
    fn test_commit_info_timestamps() {
        let doc = parse(Path::new("a.md"), b"x\n", None, Some(info())).unwrap();

        assert_eq!(doc.meta.created_at, info().created_at);
        assert_eq!(doc.meta.updated_at, info().updated_at);
    }

    #[test]
    fn test_front_matter_overrides_commit_info() {
        let raw = b"---\ndate: 2020-05-01\nauthor: bob\n---\nx\n";
        let doc = parse(Path::new("a.md"), raw, None, Some(info())).unwrap();

        assert_eq!(
            doc.meta.created_at,
            Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap()
        );
        // updated_at keeps the commit value
        assert_eq!(doc.meta.updated_at, info().updated_at);
        assert_eq!(doc.meta.author, "bob");
    }

    #[test]
    fn test_no_commit_info_falls_back_to_now() {
        let before = Utc::now();
        let doc = parse(Path::new("a.md"), b"x\n", None, None).unwrap();
        let after = Utc::now();

        assert!(doc.meta.created_at >= before && doc.meta.created_at <= after);
        assert_eq!(doc.meta.created_at, doc.meta.updated_at);
        assert_eq!(doc.meta.author, "");
    }

    // ------------------------------------------------------------------------
    // Failure modes
    // ------------------------------------------------------------------------

    #[test]
    fn test_malformed_utf8() {
        let err = parse(Path::new("a.md"), &[0xff, 0xfe, 0x00], None, None).unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument(_)));
    }

    #[test]
    fn test_invalid_front_matter_falls_through() {
        // Unparseable YAML: block still stripped, title from heading
        let raw = b"---\ntitle: [unclosed\n---\n# Real Title\nBody.\n";
        let doc = parse(Path::new("a.md"), raw, None, Some(info())).unwrap();

        assert_eq!(doc.meta.title, "Real Title");
        assert!(doc.meta.published);
        assert!(!doc.rendered.contains("unclosed"));
    }

    #[test]
    fn test_invalid_sibling_meta_falls_through() {
        let doc = parse(
            Path::new("my-post.md"),
            b"plain body\n",
            Some(b": not yaml ["),
            Some(info()),
        )
        .unwrap();

        assert_eq!(doc.meta.title, "My Post");
    }

    // ------------------------------------------------------------------------
    // Determinism
    // ------------------------------------------------------------------------

    #[test]
    fn test_reparse_is_identical() {
        let raw = b"---\ntitle: T\ntags: [x]\n---\n# H\nBody *text*.\n";
        let a = parse(Path::new("a.md"), raw, None, Some(info())).unwrap();
        let b = parse(Path::new("a.md"), raw, None, Some(info())).unwrap();

        assert_eq!(a.meta, b.meta);
        assert_eq!(a.raw, b.raw);
        assert_eq!(a.rendered, b.rendered);
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    #[test]
    fn test_identity_of() {
        assert_eq!(identity_of(Path::new("content/en/hello-world.md")), "hello-world");
        assert_eq!(identity_of(Path::new("a.md")), "a");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("my-first_post"), "My First Post");
        assert_eq!(humanize("hello"), "Hello");
        assert_eq!(humanize("a--b"), "A B");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_strip_heading_variants() {
        assert_eq!(strip_heading("# Title\nrest"), (Some("Title"), "rest"));
        assert_eq!(strip_heading("# Title"), (Some("Title"), ""));
        // ## is a section, not the post title
        assert_eq!(strip_heading("## Section\nrest"), (None, "## Section\nrest"));
        // No space after # - not a heading
        assert_eq!(strip_heading("#tag\nrest"), (None, "#tag\nrest"));
        assert_eq!(strip_heading("plain\nrest"), (None, "plain\nrest"));
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert_eq!(
            parse_datetime("2024-06-15"),
            Some(Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_datetime("2024-06-15 10:30:00"),
            Some(Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_datetime("2024-06-15T10:30:00Z"),
            Some(Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap())
        );
        assert_eq!(parse_datetime("not a date"), None);
    }
}
