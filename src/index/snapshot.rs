//! Immutable index snapshots and the query surface over them.
//!
//! A snapshot is the unit of publication: one fully-built set of language
//! partitions, never mutated after construction. Readers hold an
//! `Arc<IndexSnapshot>` for the duration of a query and can never observe
//! a partially-updated index.

use super::partition::Partition;
use crate::content::Document;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

// ============================================================================
// Query Parameters
// ============================================================================

/// Filters for [`IndexSnapshot::list`].
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Exclude documents with `published: false`
    pub published_only: bool,

    /// Only documents in this category
    pub category: Option<String>,

    /// Only documents carrying this tag
    pub tag: Option<String>,

    /// Only documents created in this "YYYY-MM" bucket
    pub month: Option<String>,

    /// Window: skip `offset` documents, then yield at most `limit`
    pub limit: Option<usize>,
    pub offset: usize,
}

// ============================================================================
// Snapshot
// ============================================================================

/// One immutable, fully-built index value.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    /// Publish counter, starting at 0 for the empty pre-build snapshot
    pub epoch: u64,

    /// When this snapshot was built
    pub built_at: Option<DateTime<Utc>>,

    /// Language tag → partition
    pub partitions: BTreeMap<String, Arc<Partition>>,
}

impl IndexSnapshot {
    /// Look up one document by language and identity. Drafts are returned
    /// too; a miss is a normal negative result, not a failure.
    pub fn get(&self, lang: &str, slug: &str) -> Option<Arc<Document>> {
        self.partitions.get(lang)?.documents.get(slug).cloned()
    }

    /// List documents for one language, newest first, filtered by `query`.
    ///
    /// Unknown languages yield an empty list.
    pub fn list(&self, lang: &str, query: &ListQuery) -> Vec<Arc<Document>> {
        let Some(partition) = self.partitions.get(lang) else {
            return Vec::new();
        };

        partition
            .aggregates
            .by_date
            .iter()
            .filter(|doc| !query.published_only || doc.meta.published)
            .filter(|doc| match &query.category {
                Some(category) => doc.meta.category.as_deref() == Some(category.as_str()),
                None => true,
            })
            .filter(|doc| match &query.tag {
                Some(tag) => doc.meta.tags.contains(tag),
                None => true,
            })
            .filter(|doc| match &query.month {
                Some(month) => &doc.month_key() == month,
                None => true,
            })
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
