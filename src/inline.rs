//! Inline run resolution: turns the children of a block element into text runs.

use crate::markup::{Element, MarkupNode};
use crate::model::{RunFormat, TextRun};

/// Resolve the inline content of `el` into runs, in document order.
///
/// Whitespace-only runs at either end of the block are dropped; the ones
/// between content are kept so adjacent words stay apart.
pub fn resolve_runs(el: &Element) -> Vec<TextRun> {
    let mut runs = Vec::new();
    resolve_into(el, &RunFormat::default(), &mut |run| runs.push(run));

    let end = runs.iter().rposition(|r| !r.is_blank()).map_or(0, |i| i + 1);
    runs.truncate(end);
    let start = runs.iter().position(|r| !r.is_blank()).unwrap_or(runs.len());
    runs.drain(..start);
    runs
}

/// Walk the children of `el` with `inherited` formatting and hand every run to `append`.
///
/// Recognized tags add their category on top of what the ancestors set, then
/// recurse, so nested combinations keep every category. Unknown elements are
/// transparent. Text is passed through verbatim, whitespace included.
pub fn resolve_into(el: &Element, inherited: &RunFormat, append: &mut dyn FnMut(TextRun)) {
    for child in &el.children {
        match child {
            MarkupNode::Text(text) => {
                if !text.is_empty() {
                    append(TextRun {
                        text: text.clone(),
                        format: inherited.clone(),
                        line_break: false,
                    });
                }
            }
            MarkupNode::Element(inner) => {
                let mut format = inherited.clone();
                match inner.name.as_str() {
                    "strong" | "b" => format.bold = true,
                    "em" | "i" => format.italic = true,
                    "u" => format.underline = true,
                    "code" => format.monospace = true,
                    "br" => {
                        append(TextRun::line_break(format));
                        continue;
                    }
                    "a" => {
                        if let Some(href) = link_target(inner) {
                            append(link_run(inner, href, format));
                            continue;
                        }
                    }
                    _ => {}
                }
                resolve_into(inner, &format, append);
            }
        }
    }
}

fn link_target(el: &Element) -> Option<&str> {
    el.attr("href").map(str::trim).filter(|h| !h.is_empty())
}

/// The link target is inlined into the visible text: `text (href)`.
fn link_run(el: &Element, href: &str, mut format: RunFormat) -> TextRun {
    let label = el.text_content();
    let text = if label.trim().is_empty() {
        href.to_string()
    } else {
        format!("{label} ({href})")
    };
    format.link = Some(href.to_string());
    TextRun {
        text,
        format,
        line_break: false,
    }
}
