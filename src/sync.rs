//! Repository synchronizer: polling loop and incremental rebuild.
//!
//! One background loop owns all index writes. Each tick runs a cycle of
//! the state machine below; readers keep querying the previously published
//! snapshot the whole time.
//!
//! # Cycle state machine
//!
//! ```text
//!          ┌──────────────────────────────────────────────┐
//!          ▼                                              │
//!  Idle ─► Checking ─► NoChanges ─────────────────────────┤
//!          │ diff_since(marker)                           │
//!          ▼                                              │
//!          HasChanges ─► Rebuilding ─► Publishing ────────┘
//!                        (affected     (atomic swap,
//!                         languages     marker advance)
//!                         only)
//! ```
//!
//! - An unreachable source is a `NoChanges` with a warning: the previous
//!   snapshot stays up and the next tick retries.
//! - A failure during Rebuilding/Publishing discards the partial work; the
//!   marker is not advanced, so the next tick retries the same diff.
//! - Ticks are strictly serialized: the loop is single-threaded, so a slow
//!   cycle delays the next tick instead of overlapping it.

use crate::config::PosternConfig;
use crate::content::{collection, parser};
use crate::index::{IndexSnapshot, IndexStore, Partition};
use crate::log;
use crate::source::{CommitInfo, Source, SourceDiff, SourceError};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

// =============================================================================
// Constants
// =============================================================================

/// Sleep granularity of the poll loop, so Ctrl+C is honored promptly.
const SLEEP_STEP: Duration = Duration::from_millis(200);

/// Consecutive source failures before warnings escalate to errors.
const FAILURE_ESCALATION: u32 = 3;

// =============================================================================
// Cycle Outcome
// =============================================================================

/// Result of one `Checking → … → Idle` pass. Never an error: failures are
/// contained inside the cycle and the previous snapshot keeps serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Empty diff, or the source was unreachable
    NoChanges,

    /// A new snapshot was published
    Published { epoch: u64, rebuilt: usize, removed: usize },

    /// Rebuilding/Publishing failed; partial work discarded
    Aborted,
}

// =============================================================================
// Synchronizer
// =============================================================================

/// Owns the poll loop and all writes to the index store.
pub struct Synchronizer {
    config: &'static PosternConfig,
    source: Arc<dyn Source>,
    store: Arc<IndexStore>,

    /// Opaque source state the last successful cycle was computed against
    marker: Option<String>,

    /// Consecutive failed checks, for log escalation
    failures: u32,
}

impl Synchronizer {
    pub fn new(
        config: &'static PosternConfig,
        source: Arc<dyn Source>,
        store: Arc<IndexStore>,
    ) -> Self {
        Self {
            config,
            source,
            store,
            marker: None,
            failures: 0,
        }
    }

    /// Initial full build: an ordinary cycle starting from no marker.
    ///
    /// Unlike steady-state ticks this is fatal on failure - there is no
    /// previous snapshot worth serving yet.
    pub fn bootstrap(&mut self) -> Result<()> {
        match self.run_cycle() {
            CycleOutcome::Published { epoch, rebuilt, .. } => {
                log!("index"; "initial build done: snapshot #{epoch}, {rebuilt} documents");
                Ok(())
            }
            CycleOutcome::NoChanges => bail!("initial index build failed: source unreachable"),
            CycleOutcome::Aborted => bail!("initial index build failed"),
        }
    }

    /// Run the poll loop until Ctrl+C.
    ///
    /// With polling disabled the index stays frozen at its startup state
    /// and the loop only waits for the interrupt.
    pub fn run_blocking(&mut self) -> Result<()> {
        let interrupted = Arc::new(AtomicBool::new(false));
        {
            let interrupted = Arc::clone(&interrupted);
            ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))
                .context("Failed to set Ctrl+C handler")?;
        }

        if !self.config.sync.polling {
            log!("sync"; "polling disabled, serving the startup snapshot");
            while !interrupted.load(Ordering::SeqCst) {
                thread::sleep(SLEEP_STEP);
            }
            return Ok(());
        }

        let interval = self.config.sync.interval_duration();
        log!("sync"; "polling {} every {}s", self.config.sync.source.display(), self.config.sync.interval);

        let mut next_tick = Instant::now() + interval;
        while !interrupted.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now < next_tick {
                thread::sleep(SLEEP_STEP.min(next_tick - now));
                continue;
            }

            self.run_cycle();

            // Scheduling from *after* the cycle keeps ticks serialized: a
            // slow rebuild delays the next check instead of overlapping it
            next_tick = Instant::now() + interval;
        }

        log!("sync"; "interrupted, shutting down");
        Ok(())
    }

    /// One full `Checking → (Rebuilding → Publishing)` pass.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        // Checking
        let diff = match self.source.diff_since(self.marker.as_deref()) {
            Ok(diff) => diff,
            Err(err) => {
                self.failures += 1;
                if self.failures >= FAILURE_ESCALATION {
                    log!("error"; "source check failed {} times in a row: {err}", self.failures);
                } else {
                    log!("warn"; "source check failed, keeping current index: {err}");
                }
                return CycleOutcome::NoChanges;
            }
        };
        self.failures = 0;

        // The very first cycle publishes even on an empty diff so every
        // configured language gets a (possibly empty) partition.
        if diff.is_empty() && self.marker.is_some() {
            self.marker = Some(diff.marker);
            return CycleOutcome::NoChanges;
        }

        // Rebuilding + Publishing, atomically from the readers' view
        match self.rebuild_and_publish(&diff) {
            Ok(outcome) => {
                self.marker = Some(diff.marker.clone());
                if let CycleOutcome::Published { epoch, rebuilt, removed } = outcome {
                    log!("sync"; "published snapshot #{epoch} ({rebuilt} rebuilt, {removed} removed)");
                }
                outcome
            }
            Err(err) => {
                // Marker not advanced: the next tick retries the same diff
                log!("error"; "cycle aborted, keeping current index: {err}");
                CycleOutcome::Aborted
            }
        }
    }

    /// Build the next snapshot off to the side and swap it in.
    fn rebuild_and_publish(&self, diff: &SourceDiff) -> Result<CycleOutcome> {
        let previous = self.store.current();
        let content = &self.config.content;

        // Languages whose folder owns at least one touched path
        let affected: FxHashSet<String> = diff
            .changed
            .iter()
            .chain(diff.removed.iter())
            .filter_map(|path| language_of(path, &content.folder))
            .collect();

        let mut partitions = BTreeMap::new();
        let mut rebuilt_total = 0;
        let mut removed_total = 0;

        for lang in &content.languages {
            let prior = previous.partitions.get(lang);

            if !affected.contains(lang.as_str()) {
                // Untouched languages are carried over by reference
                let carried = prior.cloned().unwrap_or_default();
                partitions.insert(lang.clone(), carried);
                continue;
            }

            let folder = content.language_folder(lang);
            let changed_names: Vec<PathBuf> = diff
                .changed
                .iter()
                .filter(|path| path.starts_with(&folder))
                .cloned()
                .collect();
            let removed_slugs: BTreeSet<String> = diff
                .removed
                .iter()
                .filter(|path| path.starts_with(&folder) && content.is_content_file(path))
                .map(|path| parser::identity_of(path))
                .collect();

            let source = &self.source;
            let fetch = |path: &Path| -> Result<(Vec<u8>, Option<Vec<u8>>), SourceError> {
                let raw = source.read_file(path)?;
                let meta = read_sibling_meta(source.as_ref(), path);
                Ok((raw, meta))
            };
            let stamps =
                |path: &Path| -> Option<CommitInfo> { source.commit_info(path).ok().flatten() };

            let rebuilt = collection::build(&changed_names, &content.extension, &fetch, &stamps);
            rebuilt_total += rebuilt.len();
            removed_total += removed_slugs.len();

            let next = match prior {
                Some(prior) => prior.merge(&removed_slugs, rebuilt),
                None => Partition::from_documents(rebuilt),
            };
            partitions.insert(lang.clone(), Arc::new(next));
        }

        let epoch = previous.epoch + 1;
        self.store.publish(IndexSnapshot {
            epoch,
            built_at: Some(Utc::now()),
            partitions,
        });

        Ok(CycleOutcome::Published {
            epoch,
            rebuilt: rebuilt_total,
            removed: removed_total,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Language tag owning `path`: the first component under the content folder.
///
/// `content/en/hello.md` → `Some("en")`
fn language_of(path: &Path, content_folder: &Path) -> Option<String> {
    let rest = path.strip_prefix(content_folder).ok()?;
    match rest.components().next()? {
        std::path::Component::Normal(os) => Some(os.to_str()?.to_owned()),
        _ => None,
    }
}

/// Fetch a post's sibling metadata file (`<stem>.yml` / `<stem>.yaml`).
///
/// Absence is normal; any other source error degrades to "no metadata" so
/// a flaky read cannot abort the file.
fn read_sibling_meta(source: &dyn Source, path: &Path) -> Option<Vec<u8>> {
    for ext in ["yml", "yaml"] {
        match source.read_file(&path.with_extension(ext)) {
            Ok(bytes) => return Some(bytes),
            Err(SourceError::NotFound(_)) => continue,
            Err(_) => return None,
        }
    }
    None
}

// =============================================================================
// Tests
// =============================================================================
