//! Serializing the document tree back to HTML.

use super::{Document, NodeId, NodeKind};
use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};
use std::io::Cursor;

impl Document {
    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.node_html(self.root())
    }

    /// Serialize one subtree. The synthetic root serializes as its
    /// children only.
    pub fn node_html(&self, id: NodeId) -> String {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write_node(&mut writer, id);
        let bytes = writer.into_inner().into_inner();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn write_node(&self, writer: &mut Writer<Cursor<Vec<u8>>>, id: NodeId) {
        match self.kind(id) {
            NodeKind::Document => {
                for &child in self.children(id) {
                    self.write_node(writer, child);
                }
            }
            NodeKind::Element(el) => {
                let mut start = BytesStart::new(el.name.as_str());
                for (k, v) in &el.attrs {
                    start.push_attribute((k.as_str(), v.as_str()));
                }

                if super::parse::is_void(&el.name) {
                    writer.write_event(Event::Empty(start)).ok();
                    return;
                }

                writer.write_event(Event::Start(start)).ok();
                for &child in self.children(id) {
                    self.write_node(writer, child);
                }
                writer
                    .write_event(Event::End(BytesEnd::new(el.name.as_str())))
                    .ok();
            }
            NodeKind::Text(t) => {
                writer.write_event(Event::Text(BytesText::new(t))).ok();
            }
            NodeKind::Comment(c) => {
                writer
                    .write_event(Event::Comment(BytesText::from_escaped(c.as_str())))
                    .ok();
            }
            NodeKind::Doctype(d) => {
                writer
                    .write_event(Event::DocType(BytesText::from_escaped(d.as_str())))
                    .ok();
            }
        }
    }
}
