//! In-memory index: partitions, snapshots, and the published store.
//!
//! # Ownership
//!
//! ```text
//! IndexStore ──ArcSwap──► IndexSnapshot ──► { lang → Arc<Partition> }
//!                                                      │
//!                                                      ▼
//!                                        { slug → Arc<Document> } + aggregates
//! ```
//!
//! Everything below the store is immutable; a synchronization cycle builds
//! a whole new snapshot off to the side and swaps it in atomically.

pub mod partition;
pub mod snapshot;
pub mod store;

pub use partition::Partition;
pub use snapshot::{IndexSnapshot, ListQuery};
pub use store::IndexStore;
