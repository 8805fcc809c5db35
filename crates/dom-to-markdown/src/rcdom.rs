//! [`MarkupNode`] for trees parsed by html5ever into `markup5ever_rcdom`.
//!
//! These trees carry no layout, so conversions through this adapter never
//! filter by visibility.

use std::borrow::Cow;
use std::rc::{Rc, Weak};

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::converter::convert;
use crate::error::Result;
use crate::node::{Input, MarkupNode, NodeKind};
use crate::options::ConversionOptions;

impl MarkupNode for Handle {
    fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Document => NodeKind::Document,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text { .. } => NodeKind::Text,
            NodeData::Comment { .. } => NodeKind::Comment,
            NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => NodeKind::Other,
        }
    }

    fn tag_name(&self) -> Option<Cow<'_, str>> {
        match &self.data {
            NodeData::Element { name, .. } => {
                let local: &str = &name.local;
                if local.bytes().any(|byte| byte.is_ascii_uppercase()) {
                    Some(Cow::Owned(local.to_ascii_lowercase()))
                } else {
                    Some(Cow::Borrowed(local))
                }
            }
            _ => None,
        }
    }

    fn children(&self) -> Vec<Self> {
        self.children.borrow().clone()
    }

    fn parent(&self) -> Option<Self> {
        let weak = self.parent.take();
        let parent = weak.as_ref().and_then(Weak::upgrade);
        self.parent.set(weak);
        parent
    }

    fn text(&self) -> String {
        let mut text = String::new();
        collect_text(self, &mut text);
        text
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match &self.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|attr| str::eq_ignore_ascii_case(&attr.name.local, name))
                .map(|attr| attr.value.to_string()),
            _ => None,
        }
    }

    fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

fn collect_text(node: &Handle, output: &mut String) {
    match &node.data {
        NodeData::Text { contents } => output.push_str(&contents.borrow()),
        NodeData::Element { .. } | NodeData::Document => {
            for child in node.children.borrow().iter() {
                collect_text(child, output);
            }
        }
        _ => {}
    }
}

/// Parse an HTML document from a string.
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// Parse an HTML document from UTF-8 bytes.
///
/// Invalid sequences are replaced rather than rejected; errors only come
/// from the underlying reader.
pub fn parse_html_bytes(mut bytes: &[u8]) -> Result<RcDom> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut bytes)?;
    Ok(dom)
}

/// Parses `html` and converts the whole document to Markdown.
pub fn convert_html(html: &str, options: &ConversionOptions) -> Result<String> {
    let dom = parse_html(html);
    convert(Input::Document(dom.document.clone()), options)
}
