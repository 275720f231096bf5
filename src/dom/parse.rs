//! HTML parsing into the document tree.
//!
//! Built on the same lenient `quick-xml` reader setup used for output
//! processing: text untrimmed, well-formedness checks disabled. HTML void
//! elements never take children, stray end tags are ignored, and a
//! mismatched end tag closes up to the nearest matching open element.

use super::{Document, NodeId};
use anyhow::Result;
use quick_xml::{Reader, events::Event};

/// Elements that cannot have children and are serialized without a
/// closing tag.
pub(super) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub(super) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn create_html_reader(content: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);
    reader
}

impl Document {
    /// Parse a full page into a fresh document.
    pub fn parse(html: &str) -> Result<Self> {
        let mut doc = Self::new();
        let root = doc.root();
        doc.parse_into(root, html)?;
        Ok(doc)
    }

    /// Replace `host`'s content with parsed `html` (partial injection).
    pub fn replace_children_with_html(&mut self, host: NodeId, html: &str) -> Result<()> {
        self.clear_children(host);
        self.parse_into(host, html)
    }

    /// Parse markup and append the resulting nodes under `parent`.
    fn parse_into(&mut self, parent: NodeId, html: &str) -> Result<()> {
        let mut reader = create_html_reader(html.as_bytes());
        // Open-element stack; `parent` is the insertion point for top-level nodes.
        let mut stack: Vec<NodeId> = vec![parent];

        loop {
            match reader.read_event() {
                Ok(Event::Start(elem)) => {
                    let tag = lowercase_name(elem.name().as_ref());
                    let node = self.create_element(&tag);
                    push_attributes(self, node, &elem);
                    let top = *stack.last().unwrap_or(&parent);
                    self.append_child(top, node);
                    if !is_void(&tag) {
                        stack.push(node);
                    }
                }
                Ok(Event::Empty(elem)) => {
                    let tag = lowercase_name(elem.name().as_ref());
                    let node = self.create_element(&tag);
                    push_attributes(self, node, &elem);
                    let top = *stack.last().unwrap_or(&parent);
                    self.append_child(top, node);
                }
                Ok(Event::End(elem)) => {
                    let tag = lowercase_name(elem.name().as_ref());
                    // Close up to the matching open element; ignore stray ends.
                    // stack[0] is the insertion parent and never pops.
                    if let Some(pos) = stack
                        .iter()
                        .skip(1)
                        .rposition(|&n| self.tag(n) == Some(tag.as_str()))
                    {
                        stack.truncate(pos + 1);
                    }
                }
                Ok(Event::Text(text)) => {
                    // Entity references usually arrive as GeneralRef
                    // events, but unescape here as well so raw text with
                    // inline entities never double-escapes on write.
                    let raw = String::from_utf8_lossy(&text);
                    let content = quick_xml::escape::unescape(&raw)
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| raw.into_owned());
                    self.append_text(&stack, parent, &content);
                }
                Ok(Event::CData(data)) => {
                    let content = String::from_utf8_lossy(&data).into_owned();
                    self.append_text(&stack, parent, &content);
                }
                Ok(Event::GeneralRef(entity)) => {
                    let name = String::from_utf8_lossy(&entity).into_owned();
                    let resolved = resolve_entity(&name);
                    self.append_text(&stack, parent, &resolved);
                }
                Ok(Event::Comment(comment)) => {
                    let content = String::from_utf8_lossy(&comment).into_owned();
                    let node = self.push(super::NodeKind::Comment(content));
                    let top = *stack.last().unwrap_or(&parent);
                    self.append_child(top, node);
                }
                Ok(Event::DocType(doctype)) => {
                    let content = String::from_utf8_lossy(&doctype).trim().to_string();
                    let node = self.push(super::NodeKind::Doctype(content));
                    let top = *stack.last().unwrap_or(&parent);
                    self.append_child(top, node);
                }
                Ok(Event::Eof) => break,
                // Processing instructions and XML declarations carry nothing
                // a documentation page needs.
                Ok(_) => {}
                Err(e) => anyhow::bail!(
                    "HTML parse error at position {}: {:?}",
                    reader.error_position(),
                    e
                ),
            }
        }

        Ok(())
    }

    /// Append text, merging into a preceding text sibling so entity
    /// references don't fragment the node (`a &amp; b` stays one node).
    fn append_text(&mut self, stack: &[NodeId], parent: NodeId, content: &str) {
        if content.is_empty() {
            return;
        }
        let top = *stack.last().unwrap_or(&parent);
        let last_child = self.children(top).last().copied();
        if let Some(last) = last_child
            && let super::NodeKind::Text(existing) = &mut self.node_mut(last).kind
        {
            existing.push_str(content);
            return;
        }
        let node = self.create_text(content);
        self.append_child(top, node);
    }
}

fn lowercase_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn push_attributes(doc: &mut Document, node: NodeId, elem: &quick_xml::events::BytesStart<'_>) {
    for attr in elem.attributes().flatten() {
        let key = lowercase_name(attr.key.as_ref());
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        doc.set_attr(node, &key, &value);
    }
}

/// Resolve the predefined HTML entities plus numeric character references.
/// Unknown references are kept verbatim so nothing is silently dropped.
fn resolve_entity(name: &str) -> String {
    match name {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        "nbsp" => "\u{a0}".to_string(),
        _ => {
            let code = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()));
            match code.and_then(char::from_u32) {
                Some(c) => c.to_string(),
                None => format!("&{name};"),
            }
        }
    }
}
