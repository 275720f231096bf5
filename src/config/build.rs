//! `[build]` section configuration.
//!
//! Directory layout, partial names, host element ids and output options.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in furnish.toml.
///
/// # Example
/// ```toml
/// [build]
/// pages = "pages"
/// partials = "partials"
/// output = "public"
/// minify = true
///
/// # Fetch partials from a deployed site instead of the local directory
/// # partials_url = "https://alice.github.io/widget-docs"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root (set from CLI, not from the config file).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Directory of source HTML pages.
    #[serde(default = "defaults::build::pages")]
    #[educe(Default = defaults::build::pages())]
    pub pages: PathBuf,

    /// Directory holding the header/sidebar partial fragments.
    #[serde(default = "defaults::build::partials")]
    #[educe(Default = defaults::build::partials())]
    pub partials: PathBuf,

    /// Static asset directory, copied through unchanged.
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// Output directory for enhanced pages.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Base URL to fetch partials from over HTTP instead of reading the
    /// local partials directory. The partial path is resolved against
    /// this URL plus the detected/explicit path prefix.
    #[serde(default = "defaults::build::partials_url")]
    #[educe(Default = defaults::build::partials_url())]
    pub partials_url: Option<String>,

    /// Minify the enhanced HTML output.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify: bool,

    /// Clean the output directory completely before building.
    #[serde(default = "defaults::r#false")]
    pub clean: bool,

    /// Element id hosting the header partial.
    #[serde(default = "defaults::build::header_host")]
    #[educe(Default = defaults::build::header_host())]
    pub header_host: String,

    /// Element id hosting the sidebar partial.
    #[serde(default = "defaults::build::sidebar_host")]
    #[educe(Default = defaults::build::sidebar_host())]
    pub sidebar_host: String,

    /// Header partial file name inside the partials directory.
    #[serde(default = "defaults::build::header_file")]
    #[educe(Default = defaults::build::header_file())]
    pub header_file: String,

    /// Sidebar partial file name inside the partials directory.
    #[serde(default = "defaults::build::sidebar_file")]
    #[educe(Default = defaults::build::sidebar_file())]
    pub sidebar_file: String,

    /// Class marking images that get the click-to-zoom lightbox.
    #[serde(default = "defaults::build::zoom_class")]
    #[educe(Default = defaults::build::zoom_class())]
    pub zoom_class: String,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config = r#"
            [site]
            title = "Test"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.pages, PathBuf::from("pages"));
        assert_eq!(config.build.partials, PathBuf::from("partials"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.partials_url, None);
        assert!(config.build.minify);
        assert!(!config.build.clean);
        assert_eq!(config.build.header_host, "site-header");
        assert_eq!(config.build.sidebar_host, "sidebar-container");
        assert_eq!(config.build.header_file, "header.html");
        assert_eq!(config.build.sidebar_file, "sidebar.html");
        assert_eq!(config.build.zoom_class, "zoomable");
    }

    #[test]
    fn test_build_config_overrides() {
        let config = r#"
            [site]
            title = "Test"

            [build]
            pages = "docs"
            partials = "includes"
            output = "dist"
            minify = false
            header_host = "page-header"
            sidebar_host = "page-nav"
            zoom_class = "lightbox"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.pages, PathBuf::from("docs"));
        assert_eq!(config.build.partials, PathBuf::from("includes"));
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert!(!config.build.minify);
        assert_eq!(config.build.header_host, "page-header");
        assert_eq!(config.build.sidebar_host, "page-nav");
        assert_eq!(config.build.zoom_class, "lightbox");
    }

    #[test]
    fn test_build_config_partials_url() {
        let config = r#"
            [site]
            title = "Test"

            [build]
            partials_url = "https://alice.github.io/widget-docs"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(
            config.build.partials_url,
            Some("https://alice.github.io/widget-docs".to_string())
        );
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [site]
            title = "Test"

            [build]
            unknown_field = true
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
