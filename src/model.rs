//! Output document model: blocks of styled runs plus the named styles they use.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormattingCategory {
    Bold,
    Italic,
    Underline,
    Hyperlink,
    Monospace,
    Plain,
}

/// Formatting attached to a run. Nested inline tags accumulate, so
/// `<b><i>x</i></b>` yields a run that is both bold and italic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub monospace: bool,
    pub link: Option<String>,
}

impl RunFormat {
    pub fn is_plain(&self) -> bool {
        self.categories() == [FormattingCategory::Plain]
    }

    pub fn categories(&self) -> Vec<FormattingCategory> {
        let mut out = Vec::new();
        if self.bold {
            out.push(FormattingCategory::Bold);
        }
        if self.italic {
            out.push(FormattingCategory::Italic);
        }
        if self.underline {
            out.push(FormattingCategory::Underline);
        }
        if self.link.is_some() {
            out.push(FormattingCategory::Hyperlink);
        }
        if self.monospace {
            out.push(FormattingCategory::Monospace);
        }
        if out.is_empty() {
            out.push(FormattingCategory::Plain);
        }
        out
    }

    pub fn has(&self, category: FormattingCategory) -> bool {
        self.categories().contains(&category)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub format: RunFormat,
    /// Forced line break inside the block (`br`); `text` is empty.
    pub line_break: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: RunFormat::default(),
            line_break: false,
        }
    }

    pub fn line_break(format: RunFormat) -> Self {
        Self {
            text: String::new(),
            format,
            line_break: true,
        }
    }

    /// Whitespace-only text that carries nothing but spacing.
    pub fn is_blank(&self) -> bool {
        !self.line_break && self.text.trim().is_empty()
    }
}

pub(crate) fn runs_text(runs: &[TextRun]) -> String {
    runs.iter()
        .map(|r| if r.line_break { "\n" } else { r.text.as_str() })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCell {
    pub header: bool,
    pub runs: Vec<TextRun>,
}

impl TableCell {
    pub fn text(&self) -> String {
        runs_text(&self.runs)
    }
}

/// Rectangular grid: every row holds exactly `columns` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: usize,
    pub rows: Vec<Vec<TableCell>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Level 0 is the document title, 1..=6 map to `h1`..`h6`.
    Heading { level: u8, runs: Vec<TextRun> },
    Paragraph { runs: Vec<TextRun> },
    ListItem { ordered: bool, runs: Vec<TextRun> },
    Table(Table),
}

impl Block {
    pub fn heading(level: u8, runs: Vec<TextRun>) -> Self {
        Block::Heading {
            level: level.min(MAX_HEADING_LEVEL),
            runs,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Block::Heading { runs, .. } | Block::Paragraph { runs } | Block::ListItem { runs, .. } => {
                runs_text(runs)
            }
            Block::Table(t) => t
                .rows
                .iter()
                .map(|row| row.iter().map(TableCell::text).collect::<Vec<_>>().join("\t"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

pub const MAX_HEADING_LEVEL: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Paragraph,
    Character,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleDef {
    pub id: String,
    pub name: String,
    pub kind: StyleKind,
    pub size_pt: Option<f32>,
    pub bold: bool,
    pub italic: bool,
    pub font: Option<String>,
}

impl StyleDef {
    pub fn new(id: &str, name: &str, kind: StyleKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            size_pt: None,
            bold: false,
            italic: false,
            font: None,
        }
    }
}

/// Named styles of a document, keyed by style id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    styles: BTreeMap<String, StyleDef>,
}

impl StyleSheet {
    pub fn contains(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&StyleDef> {
        self.styles.get(id)
    }

    /// Inserts `style` unless a style with the same id exists. Returns whether it was added.
    pub fn insert_if_absent(&mut self, style: StyleDef) -> bool {
        if self.styles.contains_key(&style.id) {
            return false;
        }
        self.styles.insert(style.id.clone(), style);
        true
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleDef> {
        self.styles.values()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub styles: StyleSheet,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> Option<String> {
        self.blocks.iter().find_map(|b| match b {
            Block::Heading { level: 0, runs } => Some(runs_text(runs)),
            _ => None,
        })
    }

    pub fn plain_text(&self) -> String {
        self.blocks.iter().map(Block::text).collect::<Vec<_>>().join("\n")
    }

    pub fn has_list_items(&self) -> bool {
        self.blocks.iter().any(|b| matches!(b, Block::ListItem { .. }))
    }
}
