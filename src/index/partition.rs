//! Per-language document partition with derived aggregates.
//!
//! A partition owns the `identity → Document` mapping for one language and
//! the aggregate views derived from it. Aggregates are pure functions of
//! the mapping and are recomputed wholesale on every publish; publish
//! frequency is bounded by the poll interval, so there is nothing to win
//! by patching them incrementally.

use crate::content::Document;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// ============================================================================
// Ordering
// ============================================================================

/// Newest first; equal timestamps fall back to slug order so the result is
/// deterministic across runs.
fn compare_by_date(a: &Arc<Document>, b: &Arc<Document>) -> Ordering {
    b.meta
        .created_at
        .cmp(&a.meta.created_at)
        .then_with(|| a.slug.cmp(&b.slug))
}

// ============================================================================
// Aggregates
// ============================================================================

/// Aggregate views over one partition's documents.
///
/// Unpublished documents are included here; published-only filtering
/// happens at query time so drafts stay available to privileged queries.
#[derive(Debug, Default)]
pub struct Aggregates {
    /// All documents, newest first
    pub by_date: Vec<Arc<Document>>,

    /// Documents grouped by category, each group newest first
    pub by_category: BTreeMap<String, Vec<Arc<Document>>>,

    /// Documents grouped by tag, each group newest first
    pub by_tag: BTreeMap<String, Vec<Arc<Document>>>,

    /// Documents grouped by creation month ("YYYY-MM"), newest first
    pub by_month: BTreeMap<String, Vec<Arc<Document>>>,
}

impl Aggregates {
    /// Derive all aggregate views from a document mapping. Pure and total.
    pub fn derive(documents: &BTreeMap<String, Arc<Document>>) -> Self {
        let mut by_date: Vec<Arc<Document>> = documents.values().cloned().collect();
        by_date.sort_by(compare_by_date);

        let mut by_category: BTreeMap<String, Vec<Arc<Document>>> = BTreeMap::new();
        let mut by_tag: BTreeMap<String, Vec<Arc<Document>>> = BTreeMap::new();
        let mut by_month: BTreeMap<String, Vec<Arc<Document>>> = BTreeMap::new();

        // Iterating the already-sorted list keeps every group newest first
        for doc in &by_date {
            if let Some(category) = &doc.meta.category {
                by_category
                    .entry(category.clone())
                    .or_default()
                    .push(Arc::clone(doc));
            }
            for tag in &doc.meta.tags {
                by_tag.entry(tag.clone()).or_default().push(Arc::clone(doc));
            }
            by_month
                .entry(doc.month_key())
                .or_default()
                .push(Arc::clone(doc));
        }

        Self {
            by_date,
            by_category,
            by_tag,
            by_month,
        }
    }
}

// ============================================================================
// Partition
// ============================================================================

/// One language's documents plus derived aggregates.
#[derive(Debug, Default)]
pub struct Partition {
    /// Identity → document mapping
    pub documents: BTreeMap<String, Arc<Document>>,

    /// Views derived from `documents`
    pub aggregates: Aggregates,
}

impl Partition {
    /// Build a partition from a complete document mapping.
    pub fn from_documents(documents: BTreeMap<String, Arc<Document>>) -> Self {
        let aggregates = Aggregates::derive(&documents);
        Self {
            documents,
            aggregates,
        }
    }

    /// Produce the next partition: `self` minus `removed`, overlaid with
    /// `rebuilt`. Untouched entries are carried over by reference, so their
    /// pointer identity is preserved across cycles.
    pub fn merge(
        &self,
        removed: &BTreeSet<String>,
        rebuilt: BTreeMap<String, Arc<Document>>,
    ) -> Self {
        let mut documents = self.documents.clone();
        for slug in removed {
            documents.remove(slug);
        }
        documents.extend(rebuilt);

        Self::from_documents(documents)
    }

    /// Number of documents, drafts included.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Number of published documents.
    pub fn published_len(&self) -> usize {
        self.documents.values().filter(|d| d.meta.published).count()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
