//! Copy-to-clipboard buttons for code blocks.
//!
//! Every `pre` block gets wrapped in a container with an appended copy
//! button. A click copies the block's visible text and shows transient
//! feedback ("Copied!" on success, "Error" when the clipboard rejects
//! the write) that reverts after a fixed delay. Per-block and
//! fire-and-forget: no shared state between blocks, failures are
//! retryable by clicking again.

use crate::dom::{Document, NodeId};
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long feedback labels stay up before reverting.
pub const FEEDBACK_MS: u64 = 1500;

const LABEL_RESTING: &str = "Copy";
const LABEL_COPIED: &str = "Copied!";
const LABEL_ERROR: &str = "Error";

/// Clipboard write failures. Surfaced only as inline button feedback,
/// never propagated.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard rejected the write: {0}")]
    Denied(String),

    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Write access to a clipboard. Injected so tests can fake denial.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The system clipboard via `arboard`.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Denied(e.to_string()))
    }
}

/// One wrapped code block.
#[derive(Debug, Clone, Copy)]
pub struct CodeBlock {
    pub container: NodeId,
    pub button: NodeId,
    pub block: NodeId,
}

/// Copy buttons over all code blocks of a page.
pub struct CopyButtons {
    blocks: Vec<CodeBlock>,
    /// Buttons showing feedback, with their revert deadlines.
    pending: Vec<(NodeId, Instant)>,
}

impl CopyButtons {
    /// Wrap every `pre` in `scope` with a `div.code-block` container and
    /// append a copy button.
    pub fn build(doc: &mut Document, scope: NodeId) -> Self {
        let pres: Vec<NodeId> = doc
            .descendants(scope)
            .filter(|&n| doc.is_element(n, "pre"))
            .collect();

        let blocks = pres
            .into_iter()
            .map(|pre| {
                let container = doc.create_element("div");
                doc.set_attr(container, "class", "code-block");
                doc.wrap(pre, container);

                let button = doc.create_element("button");
                doc.set_attr(button, "type", "button");
                doc.set_attr(button, "class", "copy-btn");
                doc.set_attr(button, "aria-label", "Copy code");
                doc.set_text(button, LABEL_RESTING);
                doc.append_child(container, button);

                CodeBlock {
                    container,
                    button,
                    block: pre,
                }
            })
            .collect();

        Self {
            blocks,
            pending: Vec::new(),
        }
    }

    pub fn blocks(&self) -> &[CodeBlock] {
        &self.blocks
    }

    /// A copy button was clicked: copy the block's visible text and show
    /// feedback until `now + FEEDBACK_MS`.
    pub fn click(
        &mut self,
        doc: &mut Document,
        button: NodeId,
        clipboard: &dyn Clipboard,
        now: Instant,
    ) {
        let Some(block) = self.blocks.iter().find(|b| b.button == button) else {
            return;
        };

        let text = doc.text_content(block.block);
        let label = match clipboard.write_text(&text) {
            Ok(()) => LABEL_COPIED,
            Err(_) => LABEL_ERROR,
        };
        doc.set_text(button, label);

        // A repeated click restarts the feedback window
        self.pending.retain(|(b, _)| *b != button);
        self.pending
            .push((button, now + Duration::from_millis(FEEDBACK_MS)));
    }

    /// Revert feedback labels whose deadline has passed.
    pub fn tick(&mut self, doc: &mut Document, now: Instant) {
        let mut still_pending = Vec::new();
        for (button, deadline) in self.pending.drain(..) {
            if now >= deadline {
                doc.set_text(button, LABEL_RESTING);
            } else {
                still_pending.push((button, deadline));
            }
        }
        self.pending = still_pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingClipboard {
        texts: RefCell<Vec<String>>,
    }

    impl RecordingClipboard {
        fn new() -> Self {
            Self {
                texts: RefCell::new(Vec::new()),
            }
        }
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            self.texts.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    struct DeniedClipboard;

    impl Clipboard for DeniedClipboard {
        fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Denied("permission denied".into()))
        }
    }

    fn page() -> Document {
        Document::parse("<main><pre>let x = 1;</pre><p>prose</p><pre>let y = 2;</pre></main>")
            .unwrap()
    }

    #[test]
    fn test_build_wraps_every_code_block() {
        let mut doc = page();
        let root = doc.root();
        let buttons = CopyButtons::build(&mut doc, root);

        assert_eq!(buttons.blocks().len(), 2);
        for block in buttons.blocks() {
            assert!(doc.has_class(block.container, "code-block"));
            assert_eq!(doc.parent(block.block), Some(block.container));
            assert_eq!(doc.parent(block.button), Some(block.container));
            assert_eq!(doc.text_content(block.button), "Copy");
        }
    }

    #[test]
    fn test_click_copies_block_text() {
        let mut doc = page();
        let root = doc.root();
        let mut buttons = CopyButtons::build(&mut doc, root);
        let clipboard = RecordingClipboard::new();

        let button = buttons.blocks()[0].button;
        buttons.click(&mut doc, button, &clipboard, Instant::now());

        assert_eq!(clipboard.texts.borrow().as_slice(), ["let x = 1;"]);
        assert_eq!(doc.text_content(button), "Copied!");
    }

    #[test]
    fn test_feedback_reverts_after_delay() {
        let mut doc = page();
        let root = doc.root();
        let mut buttons = CopyButtons::build(&mut doc, root);
        let clipboard = RecordingClipboard::new();
        let t0 = Instant::now();

        let button = buttons.blocks()[0].button;
        buttons.click(&mut doc, button, &clipboard, t0);

        // Still showing just before the deadline
        buttons.tick(&mut doc, t0 + Duration::from_millis(FEEDBACK_MS - 1));
        assert_eq!(doc.text_content(button), "Copied!");

        buttons.tick(&mut doc, t0 + Duration::from_millis(FEEDBACK_MS));
        assert_eq!(doc.text_content(button), "Copy");
    }

    #[test]
    fn test_denied_clipboard_shows_error_and_is_retryable() {
        let mut doc = page();
        let root = doc.root();
        let mut buttons = CopyButtons::build(&mut doc, root);
        let t0 = Instant::now();

        let button = buttons.blocks()[0].button;
        buttons.click(&mut doc, button, &DeniedClipboard, t0);
        assert_eq!(doc.text_content(button), "Error");

        buttons.tick(&mut doc, t0 + Duration::from_millis(FEEDBACK_MS));
        assert_eq!(doc.text_content(button), "Copy");

        // Retry with a working clipboard succeeds
        let clipboard = RecordingClipboard::new();
        buttons.click(&mut doc, button, &clipboard, t0 + Duration::from_secs(2));
        assert_eq!(doc.text_content(button), "Copied!");
    }

    #[test]
    fn test_blocks_are_independent() {
        let mut doc = page();
        let root = doc.root();
        let mut buttons = CopyButtons::build(&mut doc, root);
        let clipboard = RecordingClipboard::new();
        let t0 = Instant::now();

        let first = buttons.blocks()[0].button;
        let second = buttons.blocks()[1].button;
        buttons.click(&mut doc, first, &clipboard, t0);

        // The other block's button is untouched
        assert_eq!(doc.text_content(second), "Copy");

        buttons.click(&mut doc, second, &clipboard, t0 + Duration::from_millis(500));
        buttons.tick(&mut doc, t0 + Duration::from_millis(FEEDBACK_MS));

        // First reverted, second still within its own window
        assert_eq!(doc.text_content(first), "Copy");
        assert_eq!(doc.text_content(second), "Copied!");
    }

    #[test]
    fn test_click_unknown_button_is_noop() {
        let mut doc = page();
        let root = doc.root();
        let mut buttons = CopyButtons::build(&mut doc, root);
        let clipboard = RecordingClipboard::new();

        let stray = doc.create_element("button");
        buttons.click(&mut doc, stray, &clipboard, Instant::now());
        assert!(clipboard.texts.borrow().is_empty());
    }
}
