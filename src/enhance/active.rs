//! Current-page link highlighting.
//!
//! After the sidebar partial is injected, every link resolving to the
//! current page URL gets `aria-current="page"` and an `active` class.
//! `/docs/guide/` and `/docs/guide/index.html` are treated as the same
//! page.

use crate::dom::{Document, NodeId};
use url::Url;

/// Index document suffix considered equivalent to its directory URL.
const INDEX_SUFFIX: &str = "/index.html";

/// Normalize a URL for comparison: strip trailing slashes, lowercase.
pub fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_lowercase()
}

/// Whether a link points at the current page.
///
/// True on normalized equality, or when the current URL names the index
/// document and the link names its directory.
pub fn is_current(link_url: &str, current_url: &str) -> bool {
    let link = normalize_url(link_url);
    let current = normalize_url(current_url);

    link == current
        || current
            .strip_suffix(INDEX_SUFFIX)
            .is_some_and(|stripped| link == stripped)
}

/// Mark every sidebar link resolving to `page_url` as the current page.
///
/// All matches are marked; nothing deduplicates repeated links to the
/// same page. Returns the number of marked links.
pub fn mark_active_links(doc: &mut Document, sidebar: NodeId, page_url: &Url) -> usize {
    let links: Vec<(NodeId, String)> = doc
        .descendants(sidebar)
        .filter(|&n| doc.is_element(n, "a"))
        .filter_map(|n| doc.attr(n, "href").map(|href| (n, href.to_string())))
        .collect();

    let mut marked = 0;
    for (link, href) in links {
        let Ok(resolved) = page_url.join(&href) else {
            continue;
        };
        if is_current(resolved.as_str(), page_url.as_str()) {
            doc.set_attr(link, "aria-current", "page");
            doc.add_class(link, "active");
            marked += 1;
        }
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_trailing_slashes_and_lowercases() {
        assert_eq!(normalize_url("https://Docs.example.com/Guide/"), "https://docs.example.com/guide");
        assert_eq!(normalize_url("/docs///"), "/docs");
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn test_is_current_exact_match() {
        assert!(is_current(
            "https://example.com/docs/guide/",
            "https://example.com/docs/guide"
        ));
        assert!(!is_current(
            "https://example.com/docs/other",
            "https://example.com/docs/guide"
        ));
    }

    #[test]
    fn test_is_current_index_equivalence() {
        // /docs/guide/ and /docs/guide/index.html are the same page
        assert!(is_current(
            "https://example.com/docs/guide/",
            "https://example.com/docs/guide/index.html"
        ));
        assert!(!is_current(
            "https://example.com/docs/other/",
            "https://example.com/docs/guide/index.html"
        ));
    }

    #[test]
    fn test_is_current_index_equivalence_is_one_way() {
        // A link naming index.html while the current URL is the bare
        // directory only matches through normalization equality, which
        // fails here - mirrors the browser-side rule.
        assert!(!is_current(
            "https://example.com/docs/guide/index.html",
            "https://example.com/docs/guide/"
        ));
    }

    #[test]
    fn test_mark_active_links() {
        let mut doc = crate::dom::Document::parse(
            r#"<nav><ul>
                <li><a href="/docs/guide/">Guide</a></li>
                <li><a href="/docs/other/">Other</a></li>
            </ul></nav>"#,
        )
        .unwrap();
        let nav = doc.first_by_tag(doc.root(), "nav").unwrap();
        let page_url = Url::parse("https://example.com/docs/guide/index.html").unwrap();

        let marked = mark_active_links(&mut doc, nav, &page_url);
        assert_eq!(marked, 1);

        let links: Vec<NodeId> = doc
            .descendants(nav)
            .filter(|&n| doc.is_element(n, "a"))
            .collect();
        assert_eq!(doc.attr(links[0], "aria-current"), Some("page"));
        assert!(doc.has_class(links[0], "active"));
        assert_eq!(doc.attr(links[1], "aria-current"), None);
        assert!(!doc.has_class(links[1], "active"));
    }

    #[test]
    fn test_mark_active_links_marks_all_matches() {
        let mut doc = crate::dom::Document::parse(
            r#"<nav>
                <a href="/guide/">Top</a>
                <a href="/guide/index.html">Repeat</a>
            </nav>"#,
        )
        .unwrap();
        let nav = doc.first_by_tag(doc.root(), "nav").unwrap();
        let page_url = Url::parse("https://example.com/guide/index.html").unwrap();

        assert_eq!(mark_active_links(&mut doc, nav, &page_url), 2);
    }

    #[test]
    fn test_mark_active_links_relative_href() {
        let mut doc =
            crate::dom::Document::parse(r#"<nav><a href="setup.html">Setup</a></nav>"#).unwrap();
        let nav = doc.first_by_tag(doc.root(), "nav").unwrap();
        let page_url = Url::parse("https://example.com/docs/setup.html").unwrap();

        assert_eq!(mark_active_links(&mut doc, nav, &page_url), 1);
    }
}
