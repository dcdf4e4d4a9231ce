//! HTML to word-processing document conversion.
//!
//! The pipeline is `parse_html` (html5ever) -> `Converter::convert` (pure,
//! no I/O) -> `docx::save_docx`. Each stage can be used on its own.

pub mod convert;
pub mod dispatch;
pub mod docx;
pub mod error;
pub mod inline;
pub mod list;
pub mod markup;
pub mod model;
pub mod options;
pub mod styles;
pub mod table;

pub use convert::{convert, Converter};
pub use error::{Error, Result};
pub use markup::{parse_html, Element, MarkupNode};
pub use model::{Block, Document, FormattingCategory, RunFormat, Table, TableCell, TextRun};
pub use options::{ConvertOptions, HeadingFormatting, UnknownTagPolicy};

/// Parse `html` and convert it with `options`.
pub fn html_to_document(html: &str, options: &ConvertOptions) -> Result<Document> {
    let root = parse_html(html)?;
    Converter::new(options.clone()).convert(&root)
}
