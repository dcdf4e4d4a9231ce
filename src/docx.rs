//! WordprocessingML package writer for a converted `Document`.

use crate::error::Result;
use crate::model::{Block, Document, RunFormat, StyleDef, StyleKind, Table, TextRun};
use crate::styles::{self, heading_style_id, BODY_SIZE_PT, CODE_INLINE, EMPHASIS, LIST_BULLET, LIST_NUMBER, STRONG};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const BULLET_NUM_ID: u32 = 1;
const DECIMAL_NUM_ID: u32 = 2;
const LINK_COLOR: &str = "0563C1";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const REL_TYPE_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const WML_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml";

/// Schemes that never become a hyperlink relationship.
const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "data:", "vbscript:"];

fn xml_escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Every whitespace stretch becomes one space, including at the ends.
fn collapse_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if !ch.is_whitespace() {
            out.push(ch);
        } else if !out.ends_with(' ') {
            out.push(' ');
        }
    }
    out
}

fn link_href(href: &str) -> Option<&str> {
    let h = href.trim();
    let blocked = BLOCKED_SCHEMES
        .iter()
        .any(|scheme| h.get(..scheme.len()).is_some_and(|p| p.eq_ignore_ascii_case(scheme)));
    (!h.is_empty() && !blocked).then_some(h)
}

fn half_points(pt: f32) -> u32 {
    (pt * 2.0).round() as u32
}

/// Word takes a single `rStyle`; the direct properties keep combinations intact.
fn char_style(f: &RunFormat) -> Option<&'static str> {
    if f.monospace {
        Some(CODE_INLINE)
    } else if f.bold {
        Some(STRONG)
    } else if f.italic {
        Some(EMPHASIS)
    } else {
        None
    }
}

fn run_xml(run: &TextRun) -> String {
    if run.line_break {
        return "<w:r><w:br/></w:r>".to_string();
    }
    let text = collapse_ws(&run.text);
    if text.is_empty() {
        return String::new();
    }
    let f = &run.format;
    let mut out = String::from("<w:r>");
    if !f.is_plain() {
        out.push_str("<w:rPr>");
        if let Some(style) = char_style(f) {
            out.push_str(&format!("<w:rStyle w:val=\"{style}\"/>"));
        }
        if f.bold {
            out.push_str("<w:b/>");
        }
        if f.italic {
            out.push_str("<w:i/>");
        }
        if f.link.is_some() {
            out.push_str(&format!("<w:color w:val=\"{LINK_COLOR}\"/>"));
        }
        if f.underline || f.link.is_some() {
            out.push_str("<w:u w:val=\"single\"/>");
        }
        out.push_str("</w:rPr>");
    }
    out.push_str("<w:t xml:space=\"preserve\">");
    out.push_str(&xml_escape(&text));
    out.push_str("</w:t></w:r>");
    out
}

fn runs_xml(runs: &[TextRun], link_to_rid: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for run in runs {
        let rid = run
            .format
            .link
            .as_deref()
            .and_then(link_href)
            .and_then(|h| link_to_rid.get(h));
        match rid {
            Some(rid) => {
                out.push_str(&format!("<w:hyperlink r:id=\"{rid}\" w:history=\"1\">"));
                out.push_str(&run_xml(run));
                out.push_str("</w:hyperlink>");
            }
            None => out.push_str(&run_xml(run)),
        }
    }
    out
}

fn paragraph_xml(style: Option<&str>, runs: &[TextRun], link_to_rid: &BTreeMap<String, String>) -> String {
    let mut out = String::from("<w:p>");
    if let Some(style) = style {
        out.push_str(&format!("<w:pPr><w:pStyle w:val=\"{style}\"/></w:pPr>"));
    }
    out.push_str(&runs_xml(runs, link_to_rid));
    out.push_str("</w:p>");
    out
}

fn table_xml(t: &Table, link_to_rid: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    out.push_str("<w:tbl>");
    out.push_str("<w:tblPr>");
    out.push_str("<w:tblW w:w=\"0\" w:type=\"auto\"/>");
    out.push_str("<w:tblBorders>");
    for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        out.push_str(&format!(
            "<w:{side} w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"auto\"/>"
        ));
    }
    out.push_str("</w:tblBorders>");
    out.push_str("</w:tblPr>");

    out.push_str("<w:tblGrid>");
    for _ in 0..t.columns {
        out.push_str("<w:gridCol/>");
    }
    out.push_str("</w:tblGrid>");

    for row in &t.rows {
        out.push_str("<w:tr>");
        for cell in row {
            out.push_str("<w:tc>");
            out.push_str("<w:tcPr><w:tcW w:w=\"0\" w:type=\"auto\"/></w:tcPr>");
            out.push_str(&paragraph_xml(None, &cell.runs, link_to_rid));
            out.push_str("</w:tc>");
        }
        out.push_str("</w:tr>");
    }

    out.push_str("</w:tbl>");
    out
}

fn document_xml(blocks: &[Block], link_to_rid: &BTreeMap<String, String>) -> String {
    let mut body = String::new();
    for b in blocks {
        match b {
            Block::Heading { level, runs } => {
                body.push_str(&paragraph_xml(Some(&heading_style_id(*level)), runs, link_to_rid))
            }
            Block::Paragraph { runs } => body.push_str(&paragraph_xml(None, runs, link_to_rid)),
            Block::ListItem { ordered, runs } => {
                let style = if *ordered { LIST_NUMBER } else { LIST_BULLET };
                body.push_str(&paragraph_xml(Some(style), runs, link_to_rid))
            }
            Block::Table(t) => {
                body.push_str(&table_xml(t, link_to_rid));
                // Word merges adjacent tables; keep a paragraph between them.
                body.push_str("<w:p/>");
            }
        }
    }

    format!(
        r#"{XML_DECL}
<w:document xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
 xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    {body}
    <w:sectPr>
      <w:pgSz w:w="12240" w:h="15840"/>
      <w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>
      <w:cols w:space="708"/>
      <w:docGrid w:linePitch="360"/>
    </w:sectPr>
  </w:body>
</w:document>"#
    )
}

fn style_xml(style: &StyleDef, has_numbering: bool) -> String {
    let kind = match style.kind {
        StyleKind::Paragraph => "paragraph",
        StyleKind::Character => "character",
    };
    let mut out = format!(
        "  <w:style w:type=\"{kind}\" w:styleId=\"{}\">\n    <w:name w:val=\"{}\"/>\n",
        xml_escape(&style.id),
        xml_escape(&style.name)
    );
    if style.kind == StyleKind::Paragraph {
        out.push_str("    <w:basedOn w:val=\"Normal\"/>\n    <w:next w:val=\"Normal\"/>\n");
    }
    out.push_str("    <w:qFormat/>\n");

    // List styles only point at numbering.xml when that part is written.
    let num_id = match style.id.as_str() {
        LIST_BULLET if has_numbering => Some(BULLET_NUM_ID),
        LIST_NUMBER if has_numbering => Some(DECIMAL_NUM_ID),
        _ => None,
    };
    if let Some(num_id) = num_id {
        out.push_str(&format!(
            "    <w:pPr><w:numPr><w:numId w:val=\"{num_id}\"/></w:numPr><w:ind w:left=\"720\" w:hanging=\"360\"/></w:pPr>\n"
        ));
    } else if style.kind == StyleKind::Paragraph && style.bold {
        out.push_str("    <w:pPr><w:keepNext/><w:spacing w:before=\"240\" w:after=\"120\"/></w:pPr>\n");
    }

    let mut rpr = String::new();
    if let Some(font) = &style.font {
        let font = xml_escape(font);
        rpr.push_str(&format!(
            "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\" w:cs=\"{font}\"/>"
        ));
    }
    if style.bold {
        rpr.push_str("<w:b/>");
    }
    if style.italic {
        rpr.push_str("<w:i/>");
    }
    if let Some(size) = style.size_pt {
        rpr.push_str(&format!("<w:sz w:val=\"{}\"/>", half_points(size)));
    }
    if !rpr.is_empty() {
        out.push_str(&format!("    <w:rPr>{rpr}</w:rPr>\n"));
    }
    out.push_str("  </w:style>\n");
    out
}

fn styles_xml(doc: &Document, has_numbering: bool) -> String {
    let mut out = String::new();
    out.push_str(XML_DECL);
    out.push('\n');
    out.push_str(r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#);
    out.push('\n');
    out.push_str(&format!(
        "  <w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val=\"{}\"/></w:rPr></w:rPrDefault></w:docDefaults>\n",
        half_points(BODY_SIZE_PT)
    ));
    out.push_str(
        "  <w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\">\n    <w:name w:val=\"Normal\"/>\n    <w:qFormat/>\n  </w:style>\n",
    );
    for style in doc.styles.iter().filter(|s| s.id != "Normal") {
        out.push_str(&style_xml(style, has_numbering));
    }
    out.push_str("</w:styles>");
    out
}

fn abstract_num_xml(id: u32, format: &str) -> String {
    let mut out = format!(
        "  <w:abstractNum w:abstractNumId=\"{id}\">\n    <w:multiLevelType w:val=\"hybridMultilevel\"/>\n"
    );
    for ilvl in 0..9 {
        let text = if format == "bullet" {
            "•".to_string()
        } else {
            format!("%{}.", ilvl + 1)
        };
        out.push_str(&format!(
            "    <w:lvl w:ilvl=\"{ilvl}\"><w:start w:val=\"1\"/><w:numFmt w:val=\"{format}\"/><w:lvlText w:val=\"{text}\"/><w:lvlJc w:val=\"left\"/></w:lvl>\n"
        ));
    }
    out.push_str("  </w:abstractNum>\n");
    out
}

fn numbering_xml() -> String {
    let mut out = String::new();
    out.push_str(XML_DECL);
    out.push('\n');
    out.push_str(r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#);
    out.push('\n');
    out.push_str(&abstract_num_xml(BULLET_NUM_ID, "bullet"));
    out.push_str(&abstract_num_xml(DECIMAL_NUM_ID, "decimal"));
    for id in [BULLET_NUM_ID, DECIMAL_NUM_ID] {
        out.push_str(&format!(
            "  <w:num w:numId=\"{id}\"><w:abstractNumId w:val=\"{id}\"/></w:num>\n"
        ));
    }
    out.push_str("</w:numbering>");
    out
}

/// `(part name, content type suffix)` for every part under `word/`.
fn word_parts(has_numbering: bool) -> Vec<(&'static str, &'static str)> {
    let mut parts = vec![("document.xml", "document.main"), ("styles.xml", "styles")];
    if has_numbering {
        parts.push(("numbering.xml", "numbering"));
    }
    parts
}

fn content_types_xml(has_numbering: bool) -> String {
    let overrides: String = word_parts(has_numbering)
        .into_iter()
        .map(|(part, kind)| {
            format!("\n  <Override PartName=\"/word/{part}\" ContentType=\"{WML_CONTENT_TYPE}.{kind}+xml\"/>")
        })
        .collect();
    format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>{overrides}
</Types>"#
    )
}

fn relationship_xml(id: &str, kind: &str, target: &str, external: bool) -> String {
    let mode = if external { r#" TargetMode="External""# } else { "" };
    format!(
        "  <Relationship Id=\"{id}\" Type=\"{REL_TYPE_BASE}/{kind}\" Target=\"{}\"{mode}/>\n",
        xml_escape(target)
    )
}

fn relationships_xml(entries: &str) -> String {
    format!(
        "{XML_DECL}\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\n{entries}</Relationships>"
    )
}

fn rels_xml() -> String {
    relationships_xml(&relationship_xml("rId1", "officeDocument", "word/document.xml", false))
}

fn document_rels_xml(link_to_rid: &BTreeMap<String, String>, has_numbering: bool) -> String {
    let mut entries = relationship_xml("rId1", "styles", "styles.xml", false);
    if has_numbering {
        entries.push_str(&relationship_xml("rId2", "numbering", "numbering.xml", false));
    }
    for (href, rid) in link_to_rid {
        entries.push_str(&relationship_xml(rid, "hyperlink", href, true));
    }
    relationships_xml(&entries)
}

fn block_runs(block: &Block) -> Box<dyn Iterator<Item = &TextRun> + '_> {
    match block {
        Block::Heading { runs, .. } | Block::Paragraph { runs } | Block::ListItem { runs, .. } => {
            Box::new(runs.iter())
        }
        Block::Table(t) => Box::new(t.rows.iter().flatten().flat_map(|c| c.runs.iter())),
    }
}

fn gather_hrefs(blocks: &[Block]) -> BTreeSet<String> {
    blocks
        .iter()
        .flat_map(block_runs)
        .filter_map(|r| r.format.link.as_deref())
        .filter_map(link_href)
        .map(str::to_string)
        .collect()
}

fn link_relationships(blocks: &[Block]) -> BTreeMap<String, String> {
    let mut link_to_rid = BTreeMap::new();
    let mut rid_counter: u32 = 10;
    for href in gather_hrefs(blocks) {
        link_to_rid.insert(href, format!("rId{rid_counter}"));
        rid_counter += 1;
    }
    link_to_rid
}

/// Write `doc` as a .docx package into `writer`.
pub fn write_docx<W: Write + Seek>(doc: &Document, writer: W) -> Result<()> {
    // A document that skipped conversion still needs the styles it references.
    let doc: Cow<'_, Document> = if doc.styles.is_empty() {
        let mut owned = doc.clone();
        styles::ensure_styles(&mut owned.styles);
        Cow::Owned(owned)
    } else {
        Cow::Borrowed(doc)
    };

    let link_to_rid = link_relationships(&doc.blocks);
    let has_numbering = doc.has_list_items();

    let mut zip = ZipWriter::new(writer);
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", opts)?;
    zip.write_all(content_types_xml(has_numbering).as_bytes())?;

    zip.start_file("_rels/.rels", opts)?;
    zip.write_all(rels_xml().as_bytes())?;

    zip.start_file("word/document.xml", opts)?;
    zip.write_all(document_xml(&doc.blocks, &link_to_rid).as_bytes())?;

    zip.start_file("word/styles.xml", opts)?;
    zip.write_all(styles_xml(&doc, has_numbering).as_bytes())?;

    if has_numbering {
        zip.start_file("word/numbering.xml", opts)?;
        zip.write_all(numbering_xml().as_bytes())?;
    }

    zip.start_file("word/_rels/document.xml.rels", opts)?;
    zip.write_all(document_rels_xml(&link_to_rid, has_numbering).as_bytes())?;

    zip.finish()?;
    log::debug!(
        "wrote docx: {} blocks, {} links, numbering={has_numbering}",
        doc.blocks.len(),
        link_to_rid.len()
    );
    Ok(())
}

pub fn to_docx_bytes(doc: &Document) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_docx(doc, &mut cursor)?;
    Ok(cursor.into_inner())
}

pub fn save_docx(doc: &Document, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_docx(doc, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableCell;

    fn link_run(text: &str, href: &str) -> TextRun {
        TextRun {
            text: text.to_string(),
            format: RunFormat {
                link: Some(href.to_string()),
                ..Default::default()
            },
            line_break: false,
        }
    }

    #[test]
    fn escapes_and_collapses_text() {
        let xml = run_xml(&TextRun::plain("a <b>\n   & c"));
        assert!(xml.contains("a &lt;b&gt; &amp; c"));
        assert!(!xml.contains("<w:rPr>"));
    }

    #[test]
    fn whitespace_only_run_still_writes_a_space() {
        assert!(run_xml(&TextRun::plain("\n\n")).contains("\"preserve\"> </w:t>"));
        assert!(run_xml(&TextRun::plain("")).is_empty());
    }

    #[test]
    fn formatted_run_properties() {
        let run = TextRun {
            text: "x".into(),
            format: RunFormat {
                bold: true,
                italic: true,
                underline: true,
                monospace: true,
                link: None,
            },
            line_break: false,
        };
        let xml = run_xml(&run);
        assert!(xml.contains("<w:rStyle w:val=\"CodeInline\"/><w:b/><w:i/><w:u w:val=\"single\"/>"));
    }

    #[test]
    fn bold_and_italic_reference_character_styles() {
        let bold = RunFormat {
            bold: true,
            ..Default::default()
        };
        let both = RunFormat {
            italic: true,
            ..bold.clone()
        };
        let italic = RunFormat {
            italic: true,
            ..Default::default()
        };
        let run = |format| TextRun {
            text: "x".into(),
            format,
            line_break: false,
        };
        assert!(run_xml(&run(bold)).contains("<w:rStyle w:val=\"Strong\"/><w:b/>"));
        assert!(run_xml(&run(italic)).contains("<w:rStyle w:val=\"Emphasis\"/><w:i/>"));
        assert!(run_xml(&run(both)).contains("<w:rStyle w:val=\"Strong\"/><w:b/><w:i/>"));
    }

    #[test]
    fn line_break_run_writes_br() {
        let runs = vec![
            TextRun::plain("line1"),
            TextRun::line_break(RunFormat::default()),
            TextRun::plain("line2"),
        ];
        let xml = paragraph_xml(None, &runs, &BTreeMap::new());
        assert!(xml.contains("line1</w:t></w:r><w:r><w:br/></w:r><w:r><w:t xml:space=\"preserve\">line2"));
    }

    #[test]
    fn blocked_schemes_ignore_case() {
        assert_eq!(link_href("  https://x.io "), Some("https://x.io"));
        assert_eq!(link_href("JavaScript:alert(1)"), None);
        assert_eq!(link_href("DATA:text/html,x"), None);
        assert_eq!(link_href("   "), None);
    }

    #[test]
    fn unsafe_links_get_no_relationship() {
        let blocks = vec![Block::Paragraph {
            runs: vec![
                link_run("ok (https://x.io)", "https://x.io"),
                link_run("bad (javascript:alert(1))", "javascript:alert(1)"),
                link_run("again (https://x.io)", "https://x.io"),
            ],
        }];
        let rels = link_relationships(&blocks);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels.get("https://x.io").map(String::as_str), Some("rId10"));

        let xml = document_xml(&blocks, &rels);
        assert_eq!(xml.matches("<w:hyperlink").count(), 2);
        assert!(xml.contains("bad (javascript:alert(1))"));
    }

    #[test]
    fn table_links_are_gathered() {
        let table = Table {
            columns: 1,
            rows: vec![vec![TableCell {
                header: false,
                runs: vec![link_run("t", "https://t.io")],
            }]],
        };
        assert!(gather_hrefs(&[Block::Table(table)]).contains("https://t.io"));
    }

    #[test]
    fn table_grid_matches_columns() {
        let table = Table {
            columns: 3,
            rows: vec![vec![TableCell::default(), TableCell::default(), TableCell::default()]],
        };
        let xml = table_xml(&table, &BTreeMap::new());
        assert_eq!(xml.matches("<w:gridCol/>").count(), 3);
        assert_eq!(xml.matches("<w:tc>").count(), 3);
        assert_eq!(xml.matches("<w:p>").count(), 3);
    }

    #[test]
    fn styles_part_lists_provisioned_styles() {
        let mut doc = Document::new();
        styles::ensure_styles(&mut doc.styles);
        let xml = styles_xml(&doc, true);
        for id in ["Title", "Heading1", "Heading6", "Strong", "Emphasis", "CodeInline", "ListBullet", "ListNumber"] {
            assert!(xml.contains(&format!("w:styleId=\"{id}\"")), "missing {id}");
        }
        assert!(xml.contains("<w:sz w:val=\"22\"/>"));
        assert!(xml.contains("<w:numId w:val=\"2\"/>"));
        assert!(!styles_xml(&doc, false).contains("<w:numPr>"));
    }

    #[test]
    fn numbering_has_bullet_and_decimal() {
        let xml = numbering_xml();
        assert!(xml.contains("w:numFmt w:val=\"bullet\""));
        assert!(xml.contains("w:lvlText w:val=\"%1.\""));
        assert_eq!(xml.matches("<w:num ").count(), 2);
    }
}
