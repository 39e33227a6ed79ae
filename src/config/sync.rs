//! `[sync]` section configuration.
//!
//! Controls the polling synchronizer: where the source-of-truth repository
//! lives and how often it is checked for changes.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// `[sync]` section in postern.toml - source polling settings.
///
/// # Example
/// ```toml
/// [sync]
/// source = "/srv/blog-content"  # path to a git clone
/// polling = true
/// interval = 30                 # seconds between checks
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SyncSection {
    /// Path to the source-of-truth git clone. Fetching/authentication is
    /// outside postern's scope; something else keeps the clone fresh.
    #[serde(default = "defaults::sync::source")]
    #[educe(Default = defaults::sync::source())]
    pub source: PathBuf,

    /// Enable periodic polling. When disabled the index is built exactly
    /// once at startup and never refreshed.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub polling: bool,

    /// Poll interval in seconds (default: 30).
    #[serde(default = "defaults::sync::interval")]
    #[educe(Default = defaults::sync::interval())]
    pub interval: u64,
}

impl SyncSection {
    /// Poll interval as a `Duration`.
    pub fn interval_duration(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}
