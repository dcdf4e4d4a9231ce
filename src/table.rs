//! `table` conversion into a rectangular grid.

use crate::inline::resolve_runs;
use crate::markup::{Element, MarkupNode};
use crate::model::{Block, Table, TableCell};

/// Collect `tr` elements below `el`, looking through `thead`/`tbody`/`tfoot`
/// wrappers but not into nested tables.
fn collect_rows<'a>(el: &'a Element, out: &mut Vec<&'a Element>) {
    for child in el.element_children() {
        match child.name.as_str() {
            "tr" => out.push(child),
            "table" => {}
            _ => collect_rows(child, out),
        }
    }
}

fn build_cell(cell: &Element) -> TableCell {
    let header = cell.name == "th";
    let mut runs = resolve_runs(cell);
    if header {
        for run in &mut runs {
            run.format.bold = true;
        }
    }
    TableCell { header, runs }
}

/// Convert a table element. Returns `None` when there are no rows (or no cells at all).
pub fn build_table(table: &Element) -> Option<Block> {
    let mut trs = Vec::new();
    collect_rows(table, &mut trs);

    let rows: Vec<Vec<TableCell>> = trs
        .iter()
        .map(|tr| {
            tr.children
                .iter()
                .filter_map(MarkupNode::as_element)
                .filter(|c| c.name == "td" || c.name == "th")
                .map(build_cell)
                .collect()
        })
        .collect();

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        log::debug!("dropping table without cells ({} rows)", rows.len());
        return None;
    }

    let rows = rows
        .into_iter()
        .map(|mut row| {
            row.resize_with(columns, TableCell::default);
            row
        })
        .collect::<Vec<_>>();

    log::trace!("table {}x{}", rows.len(), columns);
    Some(Block::Table(Table { columns, rows }))
}
