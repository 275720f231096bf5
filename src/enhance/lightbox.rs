//! Click-to-zoom lightbox for marked images.
//!
//! Opening creates a full-screen overlay holding an unscaled clone of
//! the image, appended to `body`. Clicking the overlay background or the
//! cloned image closes it, as does Escape while the overlay exists. Only
//! one overlay exists at a time.

use super::Key;
use crate::dom::{Document, NodeId};

/// Images in `scope` carrying the zoom marker class.
pub fn zoom_targets(doc: &Document, scope: NodeId, marker_class: &str) -> Vec<NodeId> {
    doc.elements_with_class(scope, marker_class)
        .into_iter()
        .filter(|&n| doc.is_element(n, "img"))
        .collect()
}

/// Overlay state machine. Created and torn down per interaction.
#[derive(Default)]
pub struct Lightbox {
    overlay: Option<NodeId>,
}

impl Lightbox {
    pub const fn new() -> Self {
        Self { overlay: None }
    }

    pub const fn is_open(&self) -> bool {
        self.overlay.is_some()
    }

    pub const fn overlay(&self) -> Option<NodeId> {
        self.overlay
    }

    /// Open the overlay for `image`.
    ///
    /// The clone is unscaled: sizing attributes and inline sizing styles
    /// are stripped. An already-open overlay is torn down first.
    pub fn open(&mut self, doc: &mut Document, image: NodeId) -> NodeId {
        self.close(doc);

        let overlay = doc.create_element("div");
        doc.set_attr(overlay, "class", "lightbox-overlay");

        let clone = doc.clone_subtree(image);
        doc.remove_attr(clone, "width");
        doc.remove_attr(clone, "height");
        doc.remove_style(clone, "width");
        doc.remove_style(clone, "height");
        doc.append_child(overlay, clone);

        let body = doc.first_by_tag(doc.root(), "body").unwrap_or(doc.root());
        doc.append_child(body, overlay);

        self.overlay = Some(overlay);
        overlay
    }

    /// Remove the overlay from the document, if present.
    pub fn close(&mut self, doc: &mut Document) {
        if let Some(overlay) = self.overlay.take() {
            doc.detach(overlay);
        }
    }

    /// A click landed on `target`: close when it hit the overlay
    /// background or anything inside it (the cloned image).
    pub fn click(&mut self, doc: &mut Document, target: NodeId) {
        let Some(overlay) = self.overlay else {
            return;
        };
        if target == overlay || is_within(doc, overlay, target) {
            self.close(doc);
        }
    }

    /// Escape closes the overlay. With no overlay there is no listener,
    /// so the key is a no-op.
    pub fn on_key(&mut self, doc: &mut Document, key: Key) {
        if matches!(key, Key::Escape) && self.is_open() {
            self.close(doc);
        }
    }
}

fn is_within(doc: &Document, ancestor: NodeId, node: NodeId) -> bool {
    let mut current = doc.parent(node);
    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        current = doc.parent(parent);
    }
    false
}
