//! Configuration management for `postern.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                        |
//! |-------------|------------------------------------------------|
//! | `[site]`    | Site metadata (title, description)             |
//! | `[content]` | Content layout in the source (folder, langs)   |
//! | `[sync]`    | Source location and polling interval           |
//! | `[extra]`   | User-defined custom fields                     |
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "My Blog"
//!
//! [content]
//! folder = "content"
//! languages = ["en", "de"]
//!
//! [sync]
//! source = "/srv/blog-content"
//! interval = 30
//!
//! [extra]
//! analytics_id = "UA-12345"
//! ```

mod content;
pub mod defaults;
mod error;
mod site;
mod sync;

// Re-export section types used by other modules
pub use content::ContentSection;
pub use sync::SyncSection;

// Internal imports used in this module
use error::ConfigError;
use site::SiteSection;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing postern.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PosternConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub site: SiteSection,

    /// Content layout settings
    #[serde(default)]
    pub content: ContentSection,

    /// Source polling settings
    #[serde(default)]
    pub sync: SyncSection,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: HashMap<String, toml::Value>,
}

impl PosternConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: PosternConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_deref()
            .unwrap_or(Path::new("./"))
            .to_path_buf();

        // Normalize config path and source path to absolute
        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.sync.source = Self::normalize_path(&root.join(&self.sync.source));

        if let Commands::Run { interval, polling } = &cli.command {
            Self::update_option(&mut self.sync.interval, interval.as_ref());
            Self::update_option(&mut self.sync.polling, polling.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        if !self.config_path.exists() {
            bail!("Config file not found");
        }

        if self.content.languages.is_empty() {
            bail!(ConfigError::Validation(
                "[content.languages] must name at least one language".into()
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for lang in &self.content.languages {
            if lang.is_empty() {
                bail!(ConfigError::Validation(
                    "[content.languages] must not contain empty tags".into()
                ));
            }
            if !seen.insert(lang) {
                bail!(ConfigError::Validation(format!(
                    "[content.languages] lists `{lang}` twice"
                )));
            }
        }

        if self.content.extension.is_empty() || self.content.extension.starts_with('.') {
            bail!(ConfigError::Validation(
                "[content.extension] must be a bare extension like `md`".into()
            ));
        }

        if self.content.folder.is_absolute() {
            bail!(ConfigError::Validation(
                "[content.folder] must be relative to the source root".into()
            ));
        }

        if self.sync.polling && self.sync.interval == 0 {
            bail!(ConfigError::Validation(
                "[sync.interval] must be at least 1 second when polling".into()
            ));
        }

        if !self.sync.source.exists() {
            bail!(ConfigError::Validation(format!(
                "[sync.source] not found: {}",
                self.sync.source.display()
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let config_str = r#"
            [site]
            title = "My Blog"
            description = "A test blog"
        "#;
        let result = PosternConfig::from_str(config_str);

        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.site.description, "A test blog");
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let invalid_config = r#"
            [site
            title = "My Blog"
        "#;
        let result = PosternConfig::from_str(invalid_config);

        assert!(result.is_err());
    }

    #[test]
    fn test_extra_fields() {
        let config = r#"
            [extra]
            custom_field = "custom_value"
            number_field = 42
            nested = { key = "value" }
        "#;
        let config: PosternConfig = toml::from_str(config).unwrap();

        assert_eq!(
            config.extra.get("custom_field").and_then(|v| v.as_str()),
            Some("custom_value")
        );
        assert_eq!(
            config.extra.get("number_field").and_then(|v| v.as_integer()),
            Some(42)
        );
    }

    #[test]
    fn test_postern_config_default() {
        let config = PosternConfig::default();

        assert!(config.cli.is_none());
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.site.title, "");
        assert!(config.sync.polling);
        assert_eq!(config.sync.interval, 30);
        assert_eq!(config.content.extension, "md");
    }

    #[test]
    fn test_full_config_all_sections() {
        let config = r#"
            [site]
            title = "My Blog"
            description = "A personal blog"

            [content]
            folder = "posts"
            languages = ["en", "de"]
            extension = "md"

            [sync]
            source = "/srv/content"
            polling = true
            interval = 120

            [extra]
            analytics_id = "UA-12345"
        "#;
        let config: PosternConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.content.folder, PathBuf::from("posts"));
        assert_eq!(config.content.languages, vec!["en", "de"]);
        assert_eq!(config.sync.interval, 120);
        assert!(config.extra.contains_key("analytics_id"));
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let config = r#"
            [unknown_section]
            field = "value"
        "#;
        let result: Result<PosternConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_duplicate_language() {
        let mut config = PosternConfig::from_str(
            r#"
            [content]
            languages = ["en", "en"]
        "#,
        )
        .unwrap();
        // Pretend the config file and source exist so only the language
        // check can fail.
        config.config_path = std::env::current_dir().unwrap();
        config.sync.source = std::env::current_dir().unwrap();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("twice"));
    }

    #[test]
    fn test_validate_bad_extension() {
        let mut config = PosternConfig::from_str(
            r#"
            [content]
            extension = ".md"
        "#,
        )
        .unwrap();
        config.config_path = std::env::current_dir().unwrap();
        config.sync.source = std::env::current_dir().unwrap();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bare extension"));
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = PosternConfig::from_str(
            r#"
            [sync]
            interval = 0
        "#,
        )
        .unwrap();
        config.config_path = std::env::current_dir().unwrap();
        config.sync.source = std::env::current_dir().unwrap();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("interval"));
    }
}
