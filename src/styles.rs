//! Style provisioning for converted documents.

use crate::model::{StyleDef, StyleKind, StyleSheet, MAX_HEADING_LEVEL};

pub const BODY_SIZE_PT: f32 = 11.0;
pub const CODE_SIZE_PT: f32 = 10.0;
pub const CODE_FONT: &str = "Courier New";
pub const HEADING_FONT: &str = "Calibri";

pub const STRONG: &str = "Strong";
pub const EMPHASIS: &str = "Emphasis";
pub const CODE_INLINE: &str = "CodeInline";
pub const LIST_BULLET: &str = "ListBullet";
pub const LIST_NUMBER: &str = "ListNumber";

/// Style id used for a heading level. Level 0 is the document title.
pub fn heading_style_id(level: u8) -> String {
    if level == 0 {
        "Title".to_string()
    } else {
        format!("Heading{level}")
    }
}

/// Point size for a heading level; strictly decreasing with the level.
pub fn heading_size_pt(level: u8) -> f32 {
    26.0 - 2.0 * f32::from(level)
}

fn heading_style(level: u8) -> StyleDef {
    let name = if level == 0 {
        "Title".to_string()
    } else {
        format!("heading {level}")
    };
    let mut style = StyleDef::new(&heading_style_id(level), &name, StyleKind::Paragraph);
    style.size_pt = Some(heading_size_pt(level));
    style.bold = true;
    style.font = Some(HEADING_FONT.to_string());
    style
}

/// Make sure every style the converter references exists on `sheet`.
///
/// Existing styles are never redefined, so calling this again on the same
/// sheet is a no-op.
pub fn ensure_styles(sheet: &mut StyleSheet) {
    let mut added = 0usize;

    for level in 0..=MAX_HEADING_LEVEL {
        added += usize::from(sheet.insert_if_absent(heading_style(level)));
    }

    let mut strong = StyleDef::new(STRONG, "Strong", StyleKind::Character);
    strong.bold = true;
    let mut emphasis = StyleDef::new(EMPHASIS, "Emphasis", StyleKind::Character);
    emphasis.italic = true;
    let mut code = StyleDef::new(CODE_INLINE, "Code Inline", StyleKind::Character);
    code.font = Some(CODE_FONT.to_string());
    code.size_pt = Some(CODE_SIZE_PT);
    let bullet = StyleDef::new(LIST_BULLET, "List Bullet", StyleKind::Paragraph);
    let number = StyleDef::new(LIST_NUMBER, "List Number", StyleKind::Paragraph);

    for style in [strong, emphasis, code, bullet, number] {
        added += usize::from(sheet.insert_if_absent(style));
    }

    if added > 0 {
        log::debug!("provisioned {added} styles");
    }
}
