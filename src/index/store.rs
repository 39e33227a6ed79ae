//! Published index state with atomic replacement.
//!
//! Uses `arc-swap` for lock-free reads and atomic snapshot replacement.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   IndexStore (ArcSwap)                      │
//! │                                                             │
//! │  ┌─────────────┐     ┌─────────────┐     ┌─────────────┐    │
//! │  │  Reader 1   │     │  Reader 2   │     │   Writer    │    │
//! │  │  (query)    │     │  (query)    │     │  (sync)     │    │
//! │  └──────┬──────┘     └──────┬──────┘     └──────┬──────┘    │
//! │         │                   │                   │           │
//! │         ▼                   ▼                   ▼           │
//! │     current()           current()           publish()       │
//! │    (lock-free)         (lock-free)      (atomic replace)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is an explicit handle (`Arc<IndexStore>`) passed to whoever
//! needs it; there is no process-global instance. A reader that loaded a
//! snapshot before a publish keeps reading that snapshot safely: snapshots
//! are immutable once published and are released when the last reader
//! drops its `Arc`.

use super::snapshot::IndexSnapshot;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Process-wide published index state.
#[derive(Debug, Default)]
pub struct IndexStore {
    snapshot: ArcSwap<IndexSnapshot>,
}

impl IndexStore {
    /// Create a store holding the empty epoch-0 snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the currently published snapshot.
    ///
    /// Lock-free and wait-free; safe to call from any thread at any time.
    /// The returned `Arc` keeps the snapshot alive for the whole query.
    #[inline]
    pub fn current(&self) -> Arc<IndexSnapshot> {
        self.snapshot.load_full()
    }

    /// Atomically replace the published snapshot.
    ///
    /// Called by the synchronizer exactly once per successful cycle. The
    /// old snapshot remains valid for readers that already hold it.
    pub fn publish(&self, next: IndexSnapshot) {
        self.snapshot.store(Arc::new(next));
    }
}

// ============================================================================
// Tests
// ============================================================================
