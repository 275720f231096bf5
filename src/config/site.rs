//! `[site]` section configuration.
//!
//! Contains basic site information like title, url, language, etc.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[site]` section in furnish.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [site]
/// title = "Widget Docs"
/// description = "Documentation for the widget toolkit"
/// url = "https://alice.github.io/widget-docs"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteInfo {
    /// Site title displayed in the dev server listing.
    pub title: String,

    /// Site description for the scaffolded pages.
    #[serde(default)]
    pub description: String,

    /// Public URL of the site. Used to resolve sidebar links when marking
    /// the current page and to detect a project-site path prefix.
    #[serde(default = "defaults::site::url")]
    #[educe(Default = defaults::site::url())]
    pub url: Option<String>,

    /// Explicit path prefix for sites served under a subpath.
    /// Empty means: detect from `url` when it matches a known
    /// multi-tenant hosting pattern.
    #[serde(default = "defaults::site::path_prefix")]
    #[educe(Default = defaults::site::path_prefix())]
    pub path_prefix: String,

    /// BCP 47 language code (e.g., "en", "de-DE").
    #[serde(default = "defaults::site::language")]
    #[educe(Default = defaults::site::language())]
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_site_config_full() {
        let config = r#"
            [site]
            title = "Widget Docs"
            description = "Widget toolkit documentation"
            url = "https://docs.example.com"
            path_prefix = "docs"
            language = "en-US"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.title, "Widget Docs");
        assert_eq!(config.site.description, "Widget toolkit documentation");
        assert_eq!(config.site.url, Some("https://docs.example.com".to_string()));
        assert_eq!(config.site.path_prefix, "docs");
        assert_eq!(config.site.language, "en-US");
    }

    #[test]
    fn test_site_config_defaults() {
        let config = r#"
            [site]
            title = "Test"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.description, "");
        assert_eq!(config.site.url, None);
        assert_eq!(config.site.path_prefix, "");
        assert_eq!(config.site.language, "en");
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [site]
            title = "Test"
            unknown_field = "should_fail"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);

        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn test_site_config_unicode_title() {
        let config = r#"
            [site]
            title = "Docs 📚"
            language = "zh-Hans"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.title, "Docs 📚");
        assert_eq!(config.site.language, "zh-Hans");
    }
}
