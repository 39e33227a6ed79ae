//! Source-of-truth collaborators.
//!
//! The synchronizer talks to the external versioned storage through the
//! [`Source`] capability trait. Two implementations exist, selected by
//! configuration, never by inheritance:
//!
//! | Variant                  | Backing                                 |
//! |--------------------------|-----------------------------------------|
//! | [`git::GitSource`]       | HEAD of a local git clone (via gix)     |
//! | [`memory::MemorySource`] | in-memory fixture for tests and offline |
//!
//! Transport and authentication are out of scope: something else keeps the
//! clone fresh, postern only reads committed state.

pub mod git;
pub mod memory;

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Errors produced by a source-of-truth collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transient: the source could not be reached. The synchronizer treats
    /// this as "no changes" and retries on the next tick.
    #[error("source unreachable: {0}")]
    Unreachable(String),

    /// The requested path does not exist in the source.
    #[error("not found in source: {0}")]
    NotFound(PathBuf),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ============================================================================
// Diff & Commit Info
// ============================================================================

/// Result of asking the source what changed since a marker.
///
/// The `marker` is an opaque string identifying the source state the diff
/// was computed against (a commit id for git, a revision counter for the
/// in-memory source). Passing it back to `diff_since` yields the next
/// increment.
#[derive(Debug, Clone, Default)]
pub struct SourceDiff {
    /// Paths whose content changed or that appeared since the marker
    pub changed: BTreeSet<PathBuf>,

    /// Paths that disappeared since the marker
    pub removed: BTreeSet<PathBuf>,

    /// Opaque marker for the state this diff reaches
    pub marker: String,
}

impl SourceDiff {
    /// True when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Commit-derived metadata for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Time of the first commit touching the file
    pub created_at: DateTime<Utc>,

    /// Time of the latest commit touching the file
    pub updated_at: DateTime<Utc>,

    /// Name of the first committer of the file
    pub author: String,
}

// ============================================================================
// Capability Trait
// ============================================================================

/// Read access to the externally-versioned document storage.
///
/// All methods take `&self`; implementations are shared across the
/// synchronizer thread and rayon workers behind an `Arc`.
pub trait Source: Send + Sync {
    /// List all file paths under `folder`, repo-relative.
    fn list_files(&self, folder: &Path) -> Result<Vec<PathBuf>, SourceError>;

    /// Read one file's bytes. Fails with [`SourceError::NotFound`] when the
    /// path is absent.
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, SourceError>;

    /// Compute changed/removed paths since `marker`. `None` means "from
    /// the beginning": every present file is reported as changed.
    fn diff_since(&self, marker: Option<&str>) -> Result<SourceDiff, SourceError>;

    /// Commit metadata for one file, `None` when the source has no history
    /// for it (e.g. uncommitted).
    fn commit_info(&self, path: &Path) -> Result<Option<CommitInfo>, SourceError>;
}
