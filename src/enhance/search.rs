//! Sidebar search/filter component.
//!
//! Built once after the sidebar partial is injected: a search input and a
//! clear button go in right below the contents heading, and the nav list
//! is snapshotted into an in-memory index. Filtering is a plain
//! case-insensitive substring test over that index - no tokenizing, no
//! fuzzy matching.
//!
//! The component has two states keyed solely on the trimmed query:
//! **idle** (empty) and **filtering** (non-empty). Escape and the clear
//! button force idle; Enter jumps to the first visible match.

use super::Key;
use crate::dom::{Document, NodeId};

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const LIST_TAGS: &[&str] = &["ul", "ol"];

/// One indexed entry of the sidebar navigation list.
///
/// Index order matches document order, so the first match on Enter is the
/// first visible item in list order.
#[derive(Debug)]
pub struct NavItem {
    /// Original link (or item) text, case preserved.
    pub text: String,
    /// Lowercased text used for matching.
    pub lower: String,
    /// The `li` element toggled in and out of layout.
    pub item: NodeId,
    /// The nav link, when the item has one.
    pub link: Option<NodeId>,
}

/// The two states of the search feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Empty query: everything visible, clear button hidden.
    Idle,
    /// Non-empty query: list filtered, clear button shown.
    Filtering,
}

/// Where keyboard focus should go after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    None,
    /// Back to the search input (Escape, clear click).
    Input(NodeId),
    /// Jump to the first visible match (Enter).
    Link(NodeId),
}

/// Search input + clear button + nav index over one injected sidebar.
pub struct SidebarSearch {
    input: NodeId,
    clear_btn: NodeId,
    items: Vec<NavItem>,
    query: String,
}

impl SidebarSearch {
    /// Build the search UI inside an injected sidebar.
    ///
    /// Locates the contents heading and the nav list; if either is
    /// absent the feature disables itself (`None`) and the rest of the
    /// sidebar keeps working. Starts idle: clear button hidden, no
    /// filtering applied.
    pub fn build(doc: &mut Document, sidebar: NodeId) -> Option<Self> {
        let heading = doc.first_by_tags(sidebar, HEADING_TAGS)?;
        let list = doc.first_by_tags(sidebar, LIST_TAGS)?;

        let wrap = doc.create_element("div");
        doc.set_attr(wrap, "class", "sidebar-search");

        let input = doc.create_element("input");
        doc.set_attr(input, "type", "search");
        doc.set_attr(input, "id", "sidebar-search");
        doc.set_attr(input, "placeholder", "Search…");
        doc.set_attr(input, "aria-label", "Search pages");

        let clear_btn = doc.create_element("button");
        doc.set_attr(clear_btn, "type", "button");
        doc.set_attr(clear_btn, "class", "sidebar-search-clear");
        doc.set_attr(clear_btn, "aria-label", "Clear search");
        doc.set_text(clear_btn, "×");
        doc.set_style(clear_btn, "visibility", "hidden");

        doc.append_child(wrap, input);
        doc.append_child(wrap, clear_btn);

        // Right below the contents heading
        doc.insert_after(heading, wrap);

        let lis: Vec<NodeId> = doc
            .descendants(list)
            .filter(|&n| doc.is_element(n, "li"))
            .collect();
        let items = lis
            .into_iter()
            .map(|li| {
                let link = doc.descendants(li).find(|&n| doc.is_element(n, "a"));
                let text = link
                    .map_or_else(|| doc.text_content(li), |l| doc.text_content(l))
                    .trim()
                    .to_string();
                NavItem {
                    lower: text.to_lowercase(),
                    text,
                    item: li,
                    link,
                }
            })
            .collect();

        Some(Self {
            input,
            clear_btn,
            items,
            query: String::new(),
        })
    }

    pub fn state(&self) -> SearchState {
        if self.query.trim().is_empty() {
            SearchState::Idle
        } else {
            SearchState::Filtering
        }
    }

    pub const fn input(&self) -> NodeId {
        self.input
    }

    pub const fn clear_button(&self) -> NodeId {
        self.clear_btn
    }

    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    /// Apply a query to the nav list.
    ///
    /// An item stays visible when the needle (trimmed, lowercased query)
    /// is empty or a substring of its lowercased text. Hidden items are
    /// removed from layout. Visible links get the first needle occurrence
    /// wrapped in `<mark>`; an empty needle restores plain text.
    ///
    /// Returns the first visible link in document order - the Enter
    /// focus target - or `None` when nothing matches.
    pub fn filter(&mut self, doc: &mut Document, query: &str) -> Option<NodeId> {
        self.query = query.to_string();
        let needle = query.trim().to_lowercase();

        let mut first = None;
        for item in &self.items {
            let show = needle.is_empty() || item.lower.contains(&needle);
            if show {
                doc.show(item.item);
            } else {
                doc.hide(item.item);
            }
            if let Some(link) = item.link {
                render_link_text(doc, link, &item.text, &needle);
                if show && first.is_none() {
                    first = Some(link);
                }
            }
        }

        let visibility = if needle.is_empty() { "hidden" } else { "visible" };
        doc.set_style(self.clear_btn, "visibility", visibility);

        first
    }

    /// A keystroke changed the input value: refilter with it.
    pub fn on_input(&mut self, doc: &mut Document, value: &str) -> Option<NodeId> {
        doc.set_attr(self.input, "value", value);
        self.filter(doc, value)
    }

    /// Keyboard handling on the search input.
    pub fn on_key(&mut self, doc: &mut Document, key: Key) -> Focus {
        match key {
            // Clear, force idle, keep focus on the input
            Key::Escape => self.reset(doc),
            // Jump to the first visible match, if any
            Key::Enter => {
                let query = self.query.clone();
                match self.filter(doc, &query) {
                    Some(link) => Focus::Link(link),
                    None => Focus::None,
                }
            }
        }
    }

    /// Clicking the clear button behaves exactly like Escape.
    pub fn on_clear_click(&mut self, doc: &mut Document) -> Focus {
        self.reset(doc)
    }

    fn reset(&mut self, doc: &mut Document) -> Focus {
        doc.set_attr(self.input, "value", "");
        self.filter(doc, "");
        Focus::Input(self.input)
    }
}

/// Re-render a link's text, wrapping the first needle occurrence in
/// `<mark>`. Original casing is preserved inside and outside the match.
fn render_link_text(doc: &mut Document, link: NodeId, text: &str, needle: &str) {
    if needle.is_empty() {
        doc.set_text(link, text);
        return;
    }

    match find_case_insensitive(text, needle) {
        None => doc.set_text(link, text),
        Some((start, end)) => {
            doc.clear_children(link);
            if start > 0 {
                let before = doc.create_text(&text[..start]);
                doc.append_child(link, before);
            }
            let mark = doc.create_element("mark");
            doc.set_text(mark, &text[start..end]);
            doc.append_child(link, mark);
            if end < text.len() {
                let after = doc.create_text(&text[end..]);
                doc.append_child(link, after);
            }
        }
    }
}

/// Byte range of the first case-insensitive occurrence of `needle`
/// (already lowercased) in `haystack`.
///
/// Compares char by char so multi-byte lowercase mappings cannot skew
/// the reported range.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }

    for (start, _) in haystack.char_indices() {
        let rest = &haystack[start..];
        let mut rest_chars = rest.char_indices();
        let mut needle_chars = needle.chars();
        let mut end = start;

        loop {
            let Some(nc) = needle_chars.next() else {
                return Some((start, end));
            };
            match rest_chars.next() {
                Some((offset, hc)) if hc.to_lowercase().eq(nc.to_lowercase()) => {
                    end = start + offset + hc.len_utf8();
                }
                _ => break,
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIDEBAR: &str = r#"<aside class="sidebar">
        <h3>📚 Contents</h3>
        <ul>
            <li><a href="/overview/">Overview</a></li>
            <li><a href="/getting-started/">Getting Started</a></li>
            <li><a href="/api/">API Reference</a></li>
        </ul>
    </aside>"#;

    fn build_search() -> (Document, SidebarSearch) {
        let mut doc = Document::parse(SIDEBAR).unwrap();
        let sidebar = doc.first_by_tag(doc.root(), "aside").unwrap();
        let search = SidebarSearch::build(&mut doc, sidebar).expect("sidebar is well-formed");
        (doc, search)
    }

    fn visible_texts(doc: &Document, search: &SidebarSearch) -> Vec<String> {
        search
            .items()
            .iter()
            .filter(|item| !doc.is_hidden(item.item))
            .map(|item| item.text.clone())
            .collect()
    }

    #[test]
    fn test_build_indexes_items_in_document_order() {
        let (_, search) = build_search();
        let texts: Vec<_> = search.items().iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["Overview", "Getting Started", "API Reference"]);
        assert!(search.items().iter().all(|i| i.link.is_some()));
    }

    #[test]
    fn test_build_inserts_search_below_heading() {
        let (doc, _) = build_search();
        let sidebar = doc.first_by_tag(doc.root(), "aside").unwrap();

        let element_tags: Vec<_> = doc
            .children(sidebar)
            .iter()
            .filter_map(|&n| doc.tag(n).map(str::to_string))
            .collect();
        assert_eq!(element_tags, vec!["h3", "div", "ul"]);

        let wrap = doc.first_by_tag(sidebar, "div").unwrap();
        assert!(doc.has_class(wrap, "sidebar-search"));
        assert!(doc.first_by_tag(wrap, "input").is_some());
        assert!(doc.first_by_tag(wrap, "button").is_some());
    }

    #[test]
    fn test_build_without_heading_disables_feature() {
        let mut doc = Document::parse("<aside><ul><li>a</li></ul></aside>").unwrap();
        let sidebar = doc.first_by_tag(doc.root(), "aside").unwrap();
        assert!(SidebarSearch::build(&mut doc, sidebar).is_none());
    }

    #[test]
    fn test_build_without_list_disables_feature() {
        let mut doc = Document::parse("<aside><h3>Contents</h3></aside>").unwrap();
        let sidebar = doc.first_by_tag(doc.root(), "aside").unwrap();
        assert!(SidebarSearch::build(&mut doc, sidebar).is_none());
    }

    #[test]
    fn test_initial_state_idle_clear_hidden() {
        let (doc, search) = build_search();
        assert_eq!(search.state(), SearchState::Idle);
        assert_eq!(
            doc.style_value(search.clear_button(), "visibility").as_deref(),
            Some("hidden")
        );
    }

    #[test]
    fn test_filter_matches_case_insensitive_substring() {
        let (mut doc, mut search) = build_search();

        let first = search.filter(&mut doc, "api");
        assert_eq!(visible_texts(&doc, &search), vec!["API Reference"]);
        assert_eq!(first, search.items()[2].link);
        assert_eq!(search.state(), SearchState::Filtering);
    }

    #[test]
    fn test_filter_unanchored_substring() {
        let (mut doc, mut search) = build_search();

        search.filter(&mut doc, "start");
        assert_eq!(visible_texts(&doc, &search), vec!["Getting Started"]);
    }

    #[test]
    fn test_filter_trims_query() {
        let (mut doc, mut search) = build_search();

        search.filter(&mut doc, "  api  ");
        assert_eq!(visible_texts(&doc, &search), vec!["API Reference"]);

        // Whitespace-only query is idle, not a filter for spaces
        search.filter(&mut doc, "   ");
        assert_eq!(search.state(), SearchState::Idle);
        assert_eq!(visible_texts(&doc, &search).len(), 3);
    }

    #[test]
    fn test_filter_no_match_hides_everything() {
        let (mut doc, mut search) = build_search();

        let first = search.filter(&mut doc, "xyz123");
        assert!(first.is_none());
        assert!(visible_texts(&doc, &search).is_empty());
        assert_eq!(search.on_key(&mut doc, Key::Enter), Focus::None);
    }

    #[test]
    fn test_filter_empty_shows_all_and_restores_text() {
        let (mut doc, mut search) = build_search();

        search.filter(&mut doc, "api");
        let link = search.items()[2].link.unwrap();
        assert!(doc.first_by_tag(link, "mark").is_some());

        search.filter(&mut doc, "");
        assert_eq!(visible_texts(&doc, &search).len(), 3);
        assert!(doc.first_by_tag(link, "mark").is_none());
        assert_eq!(doc.text_content(link), "API Reference");
        assert_eq!(
            doc.style_value(search.clear_button(), "visibility").as_deref(),
            Some("hidden")
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let (mut doc, mut search) = build_search();

        search.filter(&mut doc, "api");
        let html_once = doc.to_html();
        search.filter(&mut doc, "api");
        assert_eq!(doc.to_html(), html_once);
    }

    #[test]
    fn test_highlight_preserves_original_case() {
        let (mut doc, mut search) = build_search();

        search.filter(&mut doc, "api");
        let link = search.items()[2].link.unwrap();
        // "API" matched case-insensitively, rendered with original casing
        assert_eq!(doc.node_html(link), r#"<a href="/api/"><mark>API</mark> Reference</a>"#);
    }

    #[test]
    fn test_highlight_wraps_first_occurrence_only() {
        let mut doc = Document::parse(
            "<aside><h3>Contents</h3><ul><li><a href=\"/\">test test</a></li></ul></aside>",
        )
        .unwrap();
        let sidebar = doc.first_by_tag(doc.root(), "aside").unwrap();
        let mut search = SidebarSearch::build(&mut doc, sidebar).unwrap();

        search.filter(&mut doc, "test");
        let link = search.items()[0].link.unwrap();
        assert_eq!(doc.node_html(link), r#"<a href="/"><mark>test</mark> test</a>"#);
    }

    #[test]
    fn test_enter_focuses_first_visible_match() {
        let (mut doc, mut search) = build_search();

        search.on_input(&mut doc, "api");
        let focus = search.on_key(&mut doc, Key::Enter);
        assert_eq!(focus, Focus::Link(search.items()[2].link.unwrap()));
    }

    #[test]
    fn test_enter_first_match_follows_list_order() {
        let (mut doc, mut search) = build_search();

        // "e" appears in every entry; first in list order wins
        search.on_input(&mut doc, "e");
        let focus = search.on_key(&mut doc, Key::Enter);
        assert_eq!(focus, Focus::Link(search.items()[0].link.unwrap()));
    }

    #[test]
    fn test_escape_always_lands_in_idle() {
        let (mut doc, mut search) = build_search();

        // From filtering
        search.on_input(&mut doc, "api");
        assert_eq!(search.state(), SearchState::Filtering);
        let focus = search.on_key(&mut doc, Key::Escape);
        assert_eq!(focus, Focus::Input(search.input()));
        assert_eq!(search.state(), SearchState::Idle);
        assert_eq!(doc.attr(search.input(), "value"), Some(""));
        assert_eq!(visible_texts(&doc, &search).len(), 3);

        // From idle: still idle
        let focus = search.on_key(&mut doc, Key::Escape);
        assert_eq!(focus, Focus::Input(search.input()));
        assert_eq!(search.state(), SearchState::Idle);
    }

    #[test]
    fn test_clear_click_matches_escape() {
        let (mut doc, mut search) = build_search();

        search.on_input(&mut doc, "start");
        let focus = search.on_clear_click(&mut doc);
        assert_eq!(focus, Focus::Input(search.input()));
        assert_eq!(search.state(), SearchState::Idle);
        assert_eq!(
            doc.style_value(search.clear_button(), "visibility").as_deref(),
            Some("hidden")
        );
    }

    #[test]
    fn test_clear_button_visible_while_filtering() {
        let (mut doc, mut search) = build_search();

        search.on_input(&mut doc, "api");
        assert_eq!(
            doc.style_value(search.clear_button(), "visibility").as_deref(),
            Some("visible")
        );
    }

    #[test]
    fn test_item_without_link_filters_but_never_focuses() {
        let mut doc = Document::parse(
            "<aside><h3>Contents</h3><ul><li>Plain entry</li><li><a href=\"/x\">Linked entry</a></li></ul></aside>",
        )
        .unwrap();
        let sidebar = doc.first_by_tag(doc.root(), "aside").unwrap();
        let mut search = SidebarSearch::build(&mut doc, sidebar).unwrap();

        let first = search.filter(&mut doc, "entry");
        // Both visible, but only the linked one is a focus target
        assert_eq!(visible_texts(&doc, &search).len(), 2);
        assert_eq!(first, search.items()[1].link);
    }

    #[test]
    fn test_find_case_insensitive() {
        assert_eq!(find_case_insensitive("API Reference", "api"), Some((0, 3)));
        assert_eq!(find_case_insensitive("Getting Started", "start"), Some((8, 13)));
        assert_eq!(find_case_insensitive("Overview", "xyz"), None);
        assert_eq!(find_case_insensitive("abc", ""), None);
    }

    #[test]
    fn test_find_case_insensitive_multibyte() {
        // Multi-byte chars before the match must not skew the byte range
        let haystack = "Écrire du Code";
        let (start, end) = find_case_insensitive(haystack, "code").unwrap();
        assert_eq!(&haystack[start..end], "Code");
    }
}
