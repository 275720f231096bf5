//! In-memory HTML tree for page enhancement.
//!
//! Pages and partials are parsed into an arena-backed tree, mutated by the
//! enhancement passes, and serialized back to HTML. Lookups return
//! `Option<NodeId>`: an absent element disables the dependent feature
//! instead of raising an error.
//!
//! Tag and attribute names are lowercased on parse, so queries compare
//! with plain `==`.

mod parse;
mod serialize;

use compact_str::CompactString;
use smallvec::SmallVec;

// ============================================================================
// Node Storage
// ============================================================================

/// Handle into a [`Document`] arena. Stable across mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One attribute: lowercased name, unescaped value.
pub type Attr = (CompactString, String);

#[derive(Debug, Clone)]
pub struct Element {
    pub name: CompactString,
    pub attrs: Vec<Attr>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Synthetic root; never serialized.
    Document,
    Element(Element),
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: SmallVec<[NodeId; 4]>,
    pub kind: NodeKind,
}

/// Arena-backed document tree.
///
/// Detached nodes stay in the arena (ids remain valid); they are simply
/// unreachable from the root and skipped by serialization.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the synthetic root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: SmallVec::new(),
                kind: NodeKind::Document,
            }],
        }
    }

    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Element tag name, or `None` for text/comment nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element(el) => Some(el.name.as_str()),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    // ========================================================================
    // Construction
    // ========================================================================

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            parent: None,
            children: SmallVec::new(),
            kind,
        });
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element {
            name: CompactString::from(tag),
            attrs: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    // ========================================================================
    // Tree Mutation
    // ========================================================================

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Insert `node` as the next sibling of `anchor`.
    /// No-op when `anchor` has no parent.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        let Some(parent) = self.node(anchor).parent else {
            return;
        };
        self.detach(node);
        let pos = self
            .node(parent)
            .children
            .iter()
            .position(|&c| c == anchor)
            .map_or(self.node(parent).children.len(), |p| p + 1);
        self.node_mut(node).parent = Some(parent);
        self.node_mut(parent).children.insert(pos, node);
    }

    /// Replace `target` with `wrapper` in its parent, then reparent
    /// `target` under `wrapper`. No-op when `target` has no parent.
    pub fn wrap(&mut self, target: NodeId, wrapper: NodeId) {
        let Some(parent) = self.node(target).parent else {
            return;
        };
        let Some(pos) = self.node(parent).children.iter().position(|&c| c == target) else {
            return;
        };
        self.node_mut(parent).children[pos] = wrapper;
        self.node_mut(wrapper).parent = Some(parent);
        self.node_mut(target).parent = Some(wrapper);
        self.node_mut(wrapper).children.push(target);
    }

    /// Remove a node from its parent. The subtree stays intact and can be
    /// re-attached later.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
            self.node_mut(id).parent = None;
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        let t = self.create_text(text);
        self.append_child(id, t);
    }

    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.node_mut(child).parent = None;
        }
    }

    /// Deep-copy a subtree. The clone is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let kind = self.node(id).kind.clone();
        let clone = self.push(kind);
        let children: Vec<NodeId> = self.node(id).children.to_vec();
        for child in children {
            let child_clone = self.clone_subtree(child);
            self.append_child(clone, child_clone);
        }
        clone
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Preorder traversal of `scope`'s subtree, excluding `scope` itself.
    /// Yields document order, which is what makes "first visible match"
    /// meaningful for the nav index.
    pub fn descendants(&self, scope: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.node(scope).children.to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// First element (document order) with the given `id` attribute.
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|&n| self.attr(n, "id") == Some(value))
    }

    pub fn first_by_tag(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(scope).find(|&n| self.is_element(n, tag))
    }

    pub fn first_by_tags(&self, scope: NodeId, tags: &[&str]) -> Option<NodeId> {
        self.descendants(scope)
            .find(|&n| self.tag(n).is_some_and(|t| tags.contains(&t)))
    }

    pub fn elements_with_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&n| self.has_class(n, class))
            .collect()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeKind::Text(t) = &self.node(id).kind {
            out.push_str(t);
        }
        for n in self.descendants(id) {
            if let NodeKind::Text(t) = &self.node(n).kind {
                out.push_str(t);
            }
        }
        out
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element(el) => el
                .attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element(el) = &mut self.node_mut(id).kind {
            match el.attrs.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => el.attrs.push((CompactString::from(name), value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeKind::Element(el) = &mut self.node_mut(id).kind {
            el.attrs.retain(|(k, _)| k != name);
        }
    }

    // ========================================================================
    // Classes
    // ========================================================================

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|v| v.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let new = match self.attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &new);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(existing) = self.attr(id, "class") {
            let new = existing
                .split_whitespace()
                .filter(|c| *c != class)
                .collect::<Vec<_>>()
                .join(" ");
            if new.is_empty() {
                self.remove_attr(id, "class");
            } else {
                self.set_attr(id, "class", &new);
            }
        }
    }

    // ========================================================================
    // Inline Styles
    // ========================================================================

    /// Value of one declaration in the `style` attribute.
    pub fn style_value(&self, id: NodeId, prop: &str) -> Option<String> {
        let style = self.attr(id, "style")?;
        style_decls(style)
            .into_iter()
            .find(|(k, _)| k == prop)
            .map(|(_, v)| v)
    }

    pub fn set_style(&mut self, id: NodeId, prop: &str, value: &str) {
        let mut decls = self
            .attr(id, "style")
            .map(style_decls)
            .unwrap_or_default();
        match decls.iter_mut().find(|(k, _)| k == prop) {
            Some((_, v)) => *v = value.to_string(),
            None => decls.push((prop.to_string(), value.to_string())),
        }
        self.set_attr(id, "style", &join_decls(&decls));
    }

    pub fn remove_style(&mut self, id: NodeId, prop: &str) {
        let Some(style) = self.attr(id, "style") else {
            return;
        };
        let decls: Vec<_> = style_decls(style)
            .into_iter()
            .filter(|(k, _)| k != prop)
            .collect();
        if decls.is_empty() {
            self.remove_attr(id, "style");
        } else {
            self.set_attr(id, "style", &join_decls(&decls));
        }
    }

    /// Remove the node from layout (`display: none`), not merely from view.
    pub fn hide(&mut self, id: NodeId) {
        self.set_style(id, "display", "none");
    }

    /// Restore default layout by dropping the `display` declaration.
    pub fn show(&mut self, id: NodeId) {
        self.remove_style(id, "display");
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.style_value(id, "display").as_deref() == Some("none")
    }
}

/// Split a `style` attribute into `(property, value)` declarations.
fn style_decls(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let (k, v) = (k.trim(), v.trim());
            (!k.is_empty()).then(|| (k.to_string(), v.to_string()))
        })
        .collect()
}

fn join_decls(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.stack.pop()?;
        let children = self.doc.children(next);
        self.stack.extend(children.iter().rev().copied());
        Some(next)
    }
}
