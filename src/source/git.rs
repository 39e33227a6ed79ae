//! Git-backed source-of-truth, reading committed state via gix.
//!
//! Only the HEAD commit of a local clone is consulted; the working tree is
//! ignored so half-written files never reach the index. Fetching is out of
//! scope: a cron job, CI hook, or human keeps the clone fresh and postern
//! picks the new HEAD up on its next poll.
//!
//! The diff marker is the HEAD commit id the last diff was computed
//! against. An unknown or garbage-collected marker degrades to a full
//! diff, which the synchronizer handles the same as the initial build.

use super::{CommitInfo, Source, SourceDiff, SourceError};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gix::{ObjectId, Repository, ThreadSafeRepository, bstr::ByteSlice};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

// ============================================================================
// GitSource
// ============================================================================

/// Source-of-truth backed by a local git clone.
pub struct GitSource {
    repo: ThreadSafeRepository,
}

impl GitSource {
    /// Open an existing git repository.
    pub fn open(root: &Path) -> Result<Self> {
        let repo = gix::open(root)
            .with_context(|| format!("Failed to open git repository at {}", root.display()))?;
        Ok(Self {
            repo: repo.into_sync(),
        })
    }
}

/// Any failure talking to the repository is transient from the
/// synchronizer's point of view.
fn unreachable(err: impl Display) -> SourceError {
    SourceError::Unreachable(err.to_string())
}

/// Resolve the HEAD commit.
fn head_commit(repo: &Repository) -> Result<gix::Commit<'_>, SourceError> {
    repo.head_commit().map_err(unreachable)
}

/// Flatten one commit's tree into a `path → blob id` map.
fn tree_index(commit: &gix::Commit<'_>) -> Result<BTreeMap<PathBuf, ObjectId>, SourceError> {
    let tree = commit.tree().map_err(unreachable)?;

    let mut recorder = gix::traverse::tree::Recorder::default();
    tree.traverse()
        .breadthfirst(&mut recorder)
        .map_err(unreachable)?;

    let mut index = BTreeMap::new();
    for record in recorder.records {
        if record.mode.is_blob() {
            index.insert(
                PathBuf::from(record.filepath.to_str_lossy().as_ref()),
                record.oid,
            );
        }
    }
    Ok(index)
}

/// Blob id of `path` in one commit's tree, `None` when absent.
fn entry_oid(
    commit: &gix::Commit<'_>,
    path: &Path,
) -> Result<Option<ObjectId>, SourceError> {
    let tree = commit.tree().map_err(unreachable)?;
    let entry = tree.lookup_entry_by_path(path).map_err(unreachable)?;
    Ok(entry.map(|e| e.oid().to_owned()))
}

/// Convert a commit timestamp to chrono, clamping unrepresentable values.
fn commit_time_utc(seconds: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or_default()
}

impl Source for GitSource {
    fn list_files(&self, folder: &Path) -> Result<Vec<PathBuf>, SourceError> {
        let repo = self.repo.to_thread_local();
        let head = head_commit(&repo)?;

        Ok(tree_index(&head)?
            .into_keys()
            .filter(|path| path.starts_with(folder))
            .collect())
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        let repo = self.repo.to_thread_local();
        let head = head_commit(&repo)?;
        let tree = head.tree().map_err(unreachable)?;

        let entry = tree
            .lookup_entry_by_path(path)
            .map_err(unreachable)?
            .ok_or_else(|| SourceError::NotFound(path.to_path_buf()))?;

        let object = entry.object().map_err(unreachable)?;
        Ok(object.data.clone())
    }

    fn diff_since(&self, marker: Option<&str>) -> Result<SourceDiff, SourceError> {
        let repo = self.repo.to_thread_local();
        let head = head_commit(&repo)?;
        let head_id = head.id;

        // Fast path: HEAD did not move
        let marker_id = marker.and_then(|m| ObjectId::from_hex(m.as_bytes()).ok());
        if marker_id == Some(head_id) {
            return Ok(SourceDiff {
                marker: head_id.to_string(),
                ..Default::default()
            });
        }

        let new_index = tree_index(&head)?;
        let old_index = match marker_id.and_then(|id| repo.find_commit(id).ok()) {
            Some(old_commit) => tree_index(&old_commit)?,
            // Unknown marker (first run, or the commit was pruned):
            // report every present file as changed
            None => BTreeMap::new(),
        };

        let changed = new_index
            .iter()
            .filter(|(path, oid)| old_index.get(*path) != Some(*oid))
            .map(|(path, _)| path.clone())
            .collect();

        let removed = old_index
            .into_keys()
            .filter(|path| !new_index.contains_key(path))
            .collect();

        Ok(SourceDiff {
            changed,
            removed,
            marker: head_id.to_string(),
        })
    }

    fn commit_info(&self, path: &Path) -> Result<Option<CommitInfo>, SourceError> {
        let repo = self.repo.to_thread_local();
        let head = head_commit(&repo)?;

        // Walk the whole ancestry and collect the commits that changed the
        // file's blob. Linear in history size, which is fine at blog scale;
        // the synchronizer only asks for files the current diff touched.
        let mut touches: Vec<(i64, String)> = Vec::new();

        let walk = repo.rev_walk(Some(head.id)).all().map_err(unreachable)?;
        for info in walk {
            let info = info.map_err(unreachable)?;
            let commit = info.object().map_err(unreachable)?;

            let Some(oid) = entry_oid(&commit, path)? else {
                continue;
            };

            let mut has_parent = false;
            let mut inherited = false;
            for parent_id in commit.parent_ids() {
                has_parent = true;
                if let Ok(parent) = repo.find_commit(parent_id.detach())
                    && entry_oid(&parent, path)? == Some(oid)
                {
                    inherited = true;
                    break;
                }
            }

            if !has_parent || !inherited {
                let time = commit.time().map_err(unreachable)?;
                let author = commit
                    .author()
                    .map(|sig| sig.name.to_str_lossy().into_owned())
                    .unwrap_or_default();
                touches.push((time.seconds, author));
            }
        }

        let Some((first_secs, first_author)) = touches
            .iter()
            .min_by_key(|(secs, _)| *secs)
            .map(|(secs, author)| (*secs, author.clone()))
        else {
            return Ok(None);
        };
        let last_secs = touches.iter().map(|(secs, _)| *secs).max().unwrap_or(first_secs);

        Ok(Some(CommitInfo {
            created_at: commit_time_utc(first_secs),
            updated_at: commit_time_utc(last_secs),
            author: first_author,
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
