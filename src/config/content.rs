//! `[content]` section configuration.
//!
//! Describes where posts live inside the source repository and which
//! languages are indexed.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `[content]` section in postern.toml - content layout inside the source.
///
/// Paths here are relative to the source repository root, not the local
/// filesystem. Each language owns one subfolder of `folder`:
/// `content/en/hello.md`, `content/de/hallo.md`, ...
///
/// # Example
/// ```toml
/// [content]
/// folder = "content"
/// languages = ["en", "de"]
/// extension = "md"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ContentSection {
    /// Folder inside the source repository holding all post content.
    #[serde(default = "defaults::content::folder")]
    #[educe(Default = defaults::content::folder())]
    pub folder: PathBuf,

    /// Language tags to index. Each tag maps to `folder/<tag>/`.
    #[serde(default = "defaults::content::languages")]
    #[educe(Default = defaults::content::languages())]
    pub languages: Vec<String>,

    /// Recognized content file extension (without the dot).
    #[serde(default = "defaults::content::extension")]
    #[educe(Default = defaults::content::extension())]
    pub extension: String,
}

impl ContentSection {
    /// Folder owning one language's documents: `folder/<lang>`.
    pub fn language_folder(&self, lang: &str) -> PathBuf {
        self.folder.join(lang)
    }

    /// Check whether a source path carries the recognized content extension.
    pub fn is_content_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }

    /// First configured language, used as the CLI default.
    pub fn default_language(&self) -> &str {
        self.languages.first().map_or("en", String::as_str)
    }
}
