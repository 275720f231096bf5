//! Per-page enhancement pipeline.
//!
//! On every page: inject the header partial, inject the sidebar partial
//! (then mark the current-page link and build the search UI inside it),
//! wrap code blocks with copy buttons and collect lightbox targets.
//! A failed partial fetch degrades that one slot - the host element is
//! left untouched and the rest of the page is still enhanced.

pub mod active;
pub mod copy;
pub mod lightbox;
pub mod search;

use crate::{
    config::SiteConfig,
    dom::{Document, NodeId},
    partial::{FetchError, PartialFetcher, PartialLoader},
};
use url::Url;

/// Keyboard events the enhancement components react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
}

/// Outcome of injecting one partial slot.
#[derive(Debug)]
pub enum SlotOutcome {
    /// Partial injected; the host element for follow-up enhancement.
    Injected(NodeId),
    /// The page has no host element for this slot.
    MissingHost,
    /// Fetch or parse failed; host left untouched.
    Failed(FetchError),
}

impl SlotOutcome {
    pub const fn host(&self) -> Option<NodeId> {
        match self {
            Self::Injected(host) => Some(*host),
            _ => None,
        }
    }

    pub const fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// What happened while enhancing one page.
#[derive(Debug)]
pub struct EnhanceReport {
    pub header: SlotOutcome,
    pub sidebar: SlotOutcome,
    /// Whether the sidebar search UI could be built.
    pub search_built: bool,
    /// Links marked as the current page.
    pub active_links: usize,
    /// Code blocks wrapped with copy buttons.
    pub code_blocks: usize,
    /// Images wired for the lightbox.
    pub zoom_targets: usize,
}

/// Run the full enhancement pass over one page.
///
/// `page_url` is the page's public URL, used to resolve sidebar links
/// when marking the current page.
pub async fn enhance_page(
    doc: &mut Document,
    page_url: &Url,
    fetcher: &dyn PartialFetcher,
    config: &SiteConfig,
) -> EnhanceReport {
    let loader = PartialLoader::new(fetcher);

    let header = inject_slot(
        &loader,
        doc,
        &config.build.header_host,
        &config.build.header_file,
    )
    .await;
    let sidebar = inject_slot(
        &loader,
        doc,
        &config.build.sidebar_host,
        &config.build.sidebar_file,
    )
    .await;

    let mut active_links = 0;
    let mut search_built = false;
    if let Some(host) = sidebar.host() {
        active_links = active::mark_active_links(doc, host, page_url);
        search_built = search::SidebarSearch::build(doc, host).is_some();
    }

    let root = doc.root();
    let code_blocks = copy::CopyButtons::build(doc, root).blocks().len();
    let zoom_targets = lightbox::zoom_targets(doc, root, &config.build.zoom_class).len();

    EnhanceReport {
        header,
        sidebar,
        search_built,
        active_links,
        code_blocks,
        zoom_targets,
    }
}

async fn inject_slot(
    loader: &PartialLoader<'_>,
    doc: &mut Document,
    host_id: &str,
    partial: &str,
) -> SlotOutcome {
    match loader.inject(doc, host_id, partial).await {
        Ok(Some(host)) => SlotOutcome::Injected(host),
        Ok(None) => SlotOutcome::MissingHost,
        Err(err) => SlotOutcome::Failed(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partial::StaticFetcher;

    const PAGE: &str = r#"<html><body>
        <header id="site-header"></header>
        <div id="sidebar-container"></div>
        <main>
            <pre>fn main() {}</pre>
            <img src="arch.png" class="zoomable">
        </main>
    </body></html>"#;

    const SIDEBAR: &str = r#"<h3>Contents</h3>
        <ul>
            <li><a href="/guide/">Guide</a></li>
            <li><a href="/api/">API</a></li>
        </ul>"#;

    fn fetcher() -> StaticFetcher {
        let mut fetcher = StaticFetcher::default();
        fetcher.insert("header.html", "<h1>Widget Docs</h1>");
        fetcher.insert("sidebar.html", SIDEBAR);
        fetcher
    }

    #[tokio::test]
    async fn test_enhance_page_full_pass() {
        let mut doc = Document::parse(PAGE).unwrap();
        let config = SiteConfig::default();
        let url = Url::parse("https://example.com/guide/index.html").unwrap();

        let report = enhance_page(&mut doc, &url, &fetcher(), &config).await;

        assert!(report.header.host().is_some());
        assert!(report.sidebar.host().is_some());
        assert!(report.search_built);
        assert_eq!(report.active_links, 1);
        assert_eq!(report.code_blocks, 1);
        assert_eq!(report.zoom_targets, 1);

        // Header content landed in its host
        let header = doc.element_by_id("site-header").unwrap();
        assert_eq!(doc.text_content(header).trim(), "Widget Docs");

        // Search input is in the page
        assert!(doc.element_by_id("sidebar-search").is_some());

        // Code block got its button
        let pre = doc.first_by_tag(doc.root(), "pre").unwrap();
        let container = doc.parent(pre).unwrap();
        assert!(doc.has_class(container, "code-block"));
    }

    #[tokio::test]
    async fn test_enhance_page_sidebar_fetch_failure_degrades_gracefully() {
        let mut doc = Document::parse(PAGE).unwrap();
        let config = SiteConfig::default();
        let url = Url::parse("https://example.com/guide/").unwrap();

        // Only the header partial is available
        let mut fetcher = StaticFetcher::default();
        fetcher.insert("header.html", "<h1>Widget Docs</h1>");

        let report = enhance_page(&mut doc, &url, &fetcher, &config).await;

        assert!(report.header.host().is_some());
        assert!(matches!(report.sidebar, SlotOutcome::Failed(_)));
        assert!(!report.search_built);
        assert_eq!(report.active_links, 0);

        // Sidebar host untouched, rest of the page still enhanced
        let sidebar = doc.element_by_id("sidebar-container").unwrap();
        assert!(doc.children(sidebar).is_empty());
        assert_eq!(report.code_blocks, 1);
    }

    #[tokio::test]
    async fn test_enhance_page_without_slots_is_noop_for_partials() {
        let mut doc = Document::parse("<html><body><main>plain</main></body></html>").unwrap();
        let config = SiteConfig::default();
        let url = Url::parse("https://example.com/").unwrap();

        let report = enhance_page(&mut doc, &url, &fetcher(), &config).await;

        assert!(matches!(report.header, SlotOutcome::MissingHost));
        assert!(matches!(report.sidebar, SlotOutcome::MissingHost));
        assert_eq!(report.code_blocks, 0);
    }
}
