//! Block-level dispatch: maps each block element to the blocks it produces.

use crate::inline::resolve_runs;
use crate::list::build_list;
use crate::markup::{Element, MarkupNode};
use crate::model::{Block, TextRun};
use crate::options::{ConvertOptions, HeadingFormatting, UnknownTagPolicy};
use crate::table::build_table;

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn is_container(tag: &str) -> bool {
    matches!(tag, "div" | "section" | "article")
}

fn has_visible_text(runs: &[TextRun]) -> bool {
    runs.iter().any(|r| !r.text.trim().is_empty())
}

/// Appends blocks for dispatched nodes to `blocks`, in document order.
pub struct Dispatcher<'a> {
    options: &'a ConvertOptions,
    blocks: &'a mut Vec<Block>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(options: &'a ConvertOptions, blocks: &'a mut Vec<Block>) -> Self {
        Self { options, blocks }
    }

    pub fn dispatch_block(&mut self, el: &Element) {
        let tag = el.name.as_str();
        log::trace!("dispatch <{tag}>");

        if let Some(level) = heading_level(tag) {
            let runs = match self.options.heading_formatting {
                HeadingFormatting::Flatten => {
                    let text = el.text_content().trim().to_string();
                    if text.is_empty() {
                        Vec::new()
                    } else {
                        vec![TextRun::plain(text)]
                    }
                }
                HeadingFormatting::PreserveInline => resolve_runs(el),
            };
            self.blocks.push(Block::heading(level, runs));
            return;
        }

        match tag {
            "p" => {
                let runs = resolve_runs(el);
                if self.options.skip_empty_paragraphs && !has_visible_text(&runs) {
                    log::debug!("skipping empty paragraph");
                    return;
                }
                self.blocks.push(Block::Paragraph { runs });
            }
            "ul" | "ol" => self.blocks.extend(build_list(el)),
            "table" => self.blocks.extend(build_table(el)),
            "br" => self.blocks.push(Block::Paragraph { runs: Vec::new() }),
            _ if is_container(tag) => self.dispatch_children(&el.children),
            _ => match self.options.unknown_tags {
                UnknownTagPolicy::Ignore => log::debug!("ignoring <{tag}>"),
                UnknownTagPolicy::Descend => self.dispatch_children(&el.children),
            },
        }
    }

    /// Dispatch element children; bare text children become their own paragraphs.
    pub fn dispatch_children(&mut self, children: &[MarkupNode]) {
        for child in children {
            match child {
                MarkupNode::Element(el) => self.dispatch_block(el),
                MarkupNode::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        self.blocks.push(Block::Paragraph {
                            runs: vec![TextRun::plain(text)],
                        });
                    }
                }
            }
        }
    }
}
