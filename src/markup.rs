//! Owned markup tree handed to the converter.
//!
//! `parse_html` runs html5ever and copies the resulting `RcDom` into plain
//! `MarkupNode` values so the conversion never touches `Rc`/`RefCell`.

use crate::error::{Error, Result};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Subtrees that carry no document content.
const STRIPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_child(mut self, child: MarkupNode) -> Self {
        self.children.push(child);
        self
    }

    /// Attribute lookup, ASCII case-insensitive on the name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(MarkupNode::as_element)
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Depth-first search for the first element named `tag`, self included.
    pub fn find_first(&self, tag: &str) -> Option<&Element> {
        if self.name == tag {
            return Some(self);
        }
        self.element_children().find_map(|c| c.find_first(tag))
    }
}

impl MarkupNode {
    pub fn element(name: &str, children: Vec<MarkupNode>) -> Self {
        MarkupNode::Element(Element {
            children,
            ..Element::new(name)
        })
    }

    pub fn text(s: &str) -> Self {
        MarkupNode::Text(s.to_string())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            MarkupNode::Element(e) => Some(e),
            MarkupNode::Text(_) => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|e| e.name.as_str())
    }

    pub fn text_content(&self) -> String {
        match self {
            MarkupNode::Element(e) => e.text_content(),
            MarkupNode::Text(t) => t.clone(),
        }
    }

    pub fn find_first(&self, tag: &str) -> Option<&Element> {
        self.as_element()?.find_first(tag)
    }
}

impl From<Element> for MarkupNode {
    fn from(el: Element) -> Self {
        MarkupNode::Element(el)
    }
}

fn collect_text(nodes: &[MarkupNode], out: &mut String) {
    for n in nodes {
        match n {
            MarkupNode::Text(t) => out.push_str(t),
            MarkupNode::Element(e) => collect_text(&e.children, out),
        }
    }
}

/// Parse an HTML document or fragment and return its document element.
pub fn parse_html(input: &str) -> Result<MarkupNode> {
    if input.trim().is_empty() {
        return Err(Error::malformed("empty html"));
    }

    let dom = parse_document(RcDom::default(), Default::default()).one(input);
    let root = dom
        .document
        .children
        .borrow()
        .iter()
        .filter_map(copy_node)
        .find(|n| n.as_element().is_some())
        .ok_or_else(|| Error::malformed("document has no root element"))?;
    Ok(root)
}

fn copy_node(handle: &Handle) -> Option<MarkupNode> {
    match &handle.data {
        NodeData::Text { contents } => Some(MarkupNode::Text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.to_string().to_ascii_lowercase();
            if STRIPPED_TAGS.contains(&tag.as_str()) {
                return None;
            }
            let attrs = attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect();
            let children = handle.children.borrow().iter().filter_map(copy_node).collect();
            Some(MarkupNode::Element(Element {
                name: tag,
                attrs,
                children,
            }))
        }
        _ => None,
    }
}
