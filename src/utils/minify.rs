//! HTML minification for enhanced output.
//!
//! Thin wrapper over the `minify_html` crate with automatic
//! enable/disable based on `SiteConfig`.

use crate::config::SiteConfig;
use std::borrow::Cow;

/// Minify enhanced HTML based on config.
///
/// Returns `Cow::Borrowed` if minify is disabled, `Cow::Owned` otherwise.
pub fn minify<'a>(html: &'a [u8], config: &SiteConfig) -> Cow<'a, [u8]> {
    if config.build.minify {
        Cow::Owned(minify_html_inner(html))
    } else {
        Cow::Borrowed(html)
    }
}

/// Minify HTML content using the `minify_html` crate.
///
/// Closing tags and the html/head opening tags are kept: the enhanced
/// markup is consumed by browsers and by re-enhancement in watch mode,
/// both of which want a complete tree.
fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(html, &cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_disabled_borrows() {
        let mut config = SiteConfig::default();
        config.build.minify = false;

        let html = b"<div>  <p>hi</p>  </div>";
        let out = minify(html, &config);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), html);
    }

    #[test]
    fn test_minify_enabled_shrinks_whitespace() {
        let config = SiteConfig::default();

        let html = b"<div>\n    <p>hi</p>\n</div>";
        let out = minify(html, &config);
        assert!(out.len() < html.len());
    }

    #[test]
    fn test_minify_keeps_closing_tags() {
        let config = SiteConfig::default();

        let out = minify(b"<ul><li>a</li><li>b</li></ul>", &config);
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("</li>"));
    }
}
