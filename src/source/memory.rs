//! In-memory source-of-truth fixture.
//!
//! Behaves like a tiny versioned store: every mutation bumps a revision
//! counter, and `diff_since` reports what moved between two revisions.
//! Used by tests and as an offline stand-in for a git clone; supports
//! fault injection (`set_unreachable`) to simulate a source outage.

use super::{CommitInfo, Source, SourceDiff, SourceError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One stored file.
#[derive(Debug, Clone)]
struct MemoryFile {
    bytes: Vec<u8>,
    /// Revision at which the file last changed
    modified_rev: u64,
    info: Option<CommitInfo>,
}

#[derive(Debug, Default)]
struct Inner {
    revision: u64,
    files: BTreeMap<PathBuf, MemoryFile>,
    /// (revision, path) pairs for removed files
    removals: Vec<(u64, PathBuf)>,
    unreachable: bool,
}

/// Versioned in-memory file store implementing [`Source`].
#[derive(Debug, Default)]
pub struct MemorySource {
    inner: Mutex<Inner>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file without commit metadata.
    pub fn insert(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.insert_file(path.into(), bytes.into(), None);
    }

    /// Insert or replace a file with commit metadata.
    pub fn insert_with_info(
        &self,
        path: impl Into<PathBuf>,
        bytes: impl Into<Vec<u8>>,
        info: CommitInfo,
    ) {
        self.insert_file(path.into(), bytes.into(), Some(info));
    }

    fn insert_file(&self, path: PathBuf, bytes: Vec<u8>, info: Option<CommitInfo>) {
        let mut inner = self.inner.lock().unwrap();
        inner.revision += 1;
        let revision = inner.revision;
        inner.files.insert(
            path,
            MemoryFile {
                bytes,
                modified_rev: revision,
                info,
            },
        );
    }

    /// Remove a file, recording the removal for later diffs.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let mut inner = self.inner.lock().unwrap();
        if inner.files.remove(path.as_ref()).is_some() {
            inner.revision += 1;
            let revision = inner.revision;
            inner.removals.push((revision, path.as_ref().to_path_buf()));
        }
    }

    /// Toggle outage simulation: while unreachable every operation fails
    /// with [`SourceError::Unreachable`].
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.lock().unwrap().unreachable = unreachable;
    }

    fn guard_reachable(inner: &Inner) -> Result<(), SourceError> {
        if inner.unreachable {
            return Err(SourceError::Unreachable("simulated outage".into()));
        }
        Ok(())
    }
}

impl Source for MemorySource {
    fn list_files(&self, folder: &Path) -> Result<Vec<PathBuf>, SourceError> {
        let inner = self.inner.lock().unwrap();
        Self::guard_reachable(&inner)?;

        Ok(inner
            .files
            .keys()
            .filter(|path| path.starts_with(folder))
            .cloned()
            .collect())
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        let inner = self.inner.lock().unwrap();
        Self::guard_reachable(&inner)?;

        inner
            .files
            .get(path)
            .map(|f| f.bytes.clone())
            .ok_or_else(|| SourceError::NotFound(path.to_path_buf()))
    }

    fn diff_since(&self, marker: Option<&str>) -> Result<SourceDiff, SourceError> {
        let inner = self.inner.lock().unwrap();
        Self::guard_reachable(&inner)?;

        // An unknown marker degrades to a full diff
        let since = marker.and_then(|m| m.parse::<u64>().ok()).unwrap_or(0);

        let changed = inner
            .files
            .iter()
            .filter(|(_, file)| file.modified_rev > since)
            .map(|(path, _)| path.clone())
            .collect();

        // A file re-added after removal shows up as changed, not removed
        let removed = inner
            .removals
            .iter()
            .filter(|(rev, path)| *rev > since && !inner.files.contains_key(path))
            .map(|(_, path)| path.clone())
            .collect();

        Ok(SourceDiff {
            changed,
            removed,
            marker: inner.revision.to_string(),
        })
    }

    fn commit_info(&self, path: &Path) -> Result<Option<CommitInfo>, SourceError> {
        let inner = self.inner.lock().unwrap();
        Self::guard_reachable(&inner)?;

        Ok(inner.files.get(path).and_then(|f| f.info.clone()))
    }
}

// ============================================================================
// Tests
// ============================================================================
