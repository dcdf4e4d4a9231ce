//! Document assembly: title, content root, dispatch.

use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::markup::{Element, MarkupNode};
use crate::model::{Block, Document, TextRun};
use crate::options::ConvertOptions;
use crate::styles::ensure_styles;

#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Convert `root` into a fresh document. Performs no I/O.
    pub fn convert(&self, root: &MarkupNode) -> Result<Document> {
        let mut doc = Document::new();
        self.convert_into(&mut doc, root)?;
        Ok(doc)
    }

    /// Append the blocks for `root` to an existing document.
    ///
    /// The root is validated before anything is written, so on error `doc`
    /// is left untouched.
    pub fn convert_into(&self, doc: &mut Document, root: &MarkupNode) -> Result<()> {
        let root = validate_root(root)?;

        ensure_styles(&mut doc.styles);

        let before = doc.blocks.len();
        if let Some(title) = self.title_text(root) {
            doc.blocks.push(Block::heading(0, vec![TextRun::plain(title)]));
        }

        let content_root = root.find_first("body").unwrap_or(root);
        Dispatcher::new(&self.options, &mut doc.blocks).dispatch_children(&content_root.children);

        log::info!("converted markup into {} blocks", doc.blocks.len() - before);
        Ok(())
    }

    fn title_text(&self, root: &Element) -> Option<String> {
        let from_markup = root
            .find_first("title")
            .map(|t| t.text_content().trim().to_string())
            .filter(|t| !t.is_empty());

        from_markup.or_else(|| {
            self.options
                .fallback_title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        })
    }
}

fn validate_root(root: &MarkupNode) -> Result<&Element> {
    match root {
        MarkupNode::Element(el) if !el.name.is_empty() => Ok(el),
        MarkupNode::Element(_) => Err(Error::malformed("root element has no tag name")),
        MarkupNode::Text(_) => Err(Error::malformed("root must be an element, got a text node")),
    }
}

/// Convert with default options.
pub fn convert(root: &MarkupNode) -> Result<Document> {
    Converter::default().convert(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StyleSheet;

    fn el(name: &str, children: Vec<MarkupNode>) -> MarkupNode {
        MarkupNode::element(name, children)
    }

    fn txt(s: &str) -> MarkupNode {
        MarkupNode::text(s)
    }

    fn page(title: Option<&str>, body: Vec<MarkupNode>) -> MarkupNode {
        let mut head = Vec::new();
        if let Some(t) = title {
            head.push(el("title", vec![txt(t)]));
        }
        el("html", vec![el("head", head), el("body", body)])
    }

    #[test]
    fn title_becomes_level_zero_heading_first() {
        let doc = convert(&page(Some(" Report "), vec![el("p", vec![txt("x")])])).unwrap();
        assert_eq!(doc.blocks[0], Block::heading(0, vec![TextRun::plain("Report")]));
        assert_eq!(doc.title().as_deref(), Some("Report"));
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn blank_title_is_skipped() {
        let doc = convert(&page(Some("   "), vec![el("p", vec![txt("x")])])).unwrap();
        assert!(doc.title().is_none());
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn fallback_title_only_without_markup_title() {
        let converter = Converter::new(ConvertOptions {
            fallback_title: Some("Fallback".into()),
            ..Default::default()
        });
        let doc = converter.convert(&page(None, vec![])).unwrap();
        assert_eq!(doc.title().as_deref(), Some("Fallback"));
        let doc = converter.convert(&page(Some("Real"), vec![])).unwrap();
        assert_eq!(doc.title().as_deref(), Some("Real"));
    }

    #[test]
    fn head_content_is_not_dispatched() {
        let doc = convert(&page(Some("T"), vec![])).unwrap();
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn without_body_the_root_children_are_dispatched() {
        let root = el("div", vec![el("h1", vec![txt("Top")]), el("p", vec![txt("para")])]);
        let doc = convert(&root).unwrap();
        assert_eq!(doc.blocks.len(), 2);
        assert!(matches!(doc.blocks[0], Block::Heading { level: 1, .. }));
        assert_eq!(doc.blocks[1].text(), "para");
    }

    #[test]
    fn text_root_is_malformed() {
        assert!(matches!(convert(&txt("oops")), Err(Error::MalformedInput(_))));
        let nameless = MarkupNode::Element(Element {
            name: String::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        });
        assert!(matches!(convert(&nameless), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn styles_are_provisioned_once_across_batches() {
        let converter = Converter::default();
        let mut doc = Document::new();
        converter.convert_into(&mut doc, &page(None, vec![el("p", vec![txt("a")])])).unwrap();
        let styles: StyleSheet = doc.styles.clone();
        converter.convert_into(&mut doc, &page(None, vec![el("p", vec![txt("b")])])).unwrap();
        assert_eq!(doc.styles, styles);
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn failed_conversion_leaves_document_untouched() {
        let mut doc = Document::new();
        assert!(Converter::default().convert_into(&mut doc, &txt("x")).is_err());
        assert!(doc.styles.is_empty());
        assert!(doc.blocks.is_empty());
    }
}
