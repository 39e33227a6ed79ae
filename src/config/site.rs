//! `[site]` section configuration.
//!
//! Basic site metadata, used for display in CLI output only.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[site]` section in postern.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [site]
/// title = "My Blog"
/// description = "A personal blog about Rust"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    /// Site title shown in CLI summaries.
    #[serde(default = "defaults::site::title")]
    #[educe(Default = defaults::site::title())]
    pub title: String,

    /// Site description.
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::super::PosternConfig;

    #[test]
    fn test_site_section_full() {
        let config = r#"
            [site]
            title = "KawaYww"
            description = "KawaYww's Blog"
        "#;
        let config: PosternConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.title, "KawaYww");
        assert_eq!(config.site.description, "KawaYww's Blog");
    }

    #[test]
    fn test_site_section_defaults() {
        let config: PosternConfig = toml::from_str("").unwrap();

        assert_eq!(config.site.title, "");
        assert_eq!(config.site.description, "");
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [site]
            title = "Test"
            unknown_field = "should_fail"
        "#;
        let result: Result<PosternConfig, _> = toml::from_str(config);

        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn test_site_section_unicode() {
        let config = r#"
            [site]
            title = "My Blog 🚀"
            description = "This is a blog with unicode"
        "#;
        let config: PosternConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.title, "My Blog 🚀");
    }
}
