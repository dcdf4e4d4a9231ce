//! `ul`/`ol` conversion.

use crate::inline::resolve_runs;
use crate::markup::Element;
use crate::model::Block;

/// One list item block per direct `li` child.
///
/// Lists nested inside an item are not expanded: their text becomes part of
/// the enclosing item's runs.
pub fn build_list(list: &Element) -> Vec<Block> {
    let ordered = list.name == "ol";
    list.element_children()
        .filter(|child| child.name == "li")
        .map(|li| Block::ListItem {
            ordered,
            runs: resolve_runs(li),
        })
        .collect()
}
