//! Document model and parsing pipeline.
//!
//! A `Document` is one parsed content unit: the decoded source text, the
//! rendered HTML body, and the metadata resolved from front matter, the
//! leading heading, or the file name.
//!
//! # Pipeline
//!
//! ```text
//! raw bytes ──► front_matter::split ──► parser::parse ──► markdown::render
//!                (strip + parse)        (title/meta        (HTML body)
//!                                        resolution)
//! ```

pub mod collection;
pub mod front_matter;
pub mod markdown;
pub mod parser;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Per-document parse errors.
///
/// These never abort a whole collection build; the failing file is excluded
/// and the rest of the collection proceeds.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document is not valid UTF-8")]
    MalformedDocument(#[source] std::str::Utf8Error),

    #[error("front matter is not valid YAML")]
    InvalidFormat(#[source] serde_yaml_ng::Error),
}

// ============================================================================
// Document Model
// ============================================================================

/// One parsed content unit.
///
/// Documents are immutable once built and shared as `Arc<Document>`; a
/// change in the source replaces the whole value. Untouched documents keep
/// their pointer identity across synchronization cycles.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Identity within a language partition (file stem, e.g. "hello-world")
    pub slug: String,

    /// Repo-relative source path, used to re-read raw content
    pub path: PathBuf,

    /// Decoded source text as last read
    #[serde(skip_serializing)]
    pub raw: String,

    /// Rendered HTML body, always derived from the current `raw`
    #[serde(skip_serializing)]
    pub rendered: String,

    /// Resolved metadata
    pub meta: PostMeta,
}

/// Metadata of a single post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostMeta {
    /// Post title (front matter > leading heading > humanized file stem)
    pub title: String,

    /// Optional category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Tags, order-irrelevant
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    /// Whether the post is published (drafts carry `published: false`)
    pub published: bool,

    /// First committer of the file; empty when unavailable
    pub author: String,

    /// First-commit time, or the time of first observation
    pub created_at: DateTime<Utc>,

    /// Latest-commit time, or the time of first observation
    pub updated_at: DateTime<Utc>,

    /// Optional title image path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_image: Option<String>,
}

impl Document {
    /// Month bucket of the creation date, e.g. `"2024-06"`.
    pub fn month_key(&self) -> String {
        self.meta.created_at.format("%Y-%m").to_string()
    }
}
