use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingFormatting {
    /// Headings become a single plain run of their flattened text.
    #[default]
    Flatten,
    /// Headings keep inline runs like paragraphs do.
    PreserveInline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownTagPolicy {
    /// Unrecognized block elements and everything under them are skipped.
    #[default]
    Ignore,
    /// Unrecognized block elements are treated like `div`.
    Descend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub skip_empty_paragraphs: bool,
    pub heading_formatting: HeadingFormatting,
    pub unknown_tags: UnknownTagPolicy,
    /// Title used when the markup has no non-empty `title` element.
    pub fallback_title: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            skip_empty_paragraphs: true,
            heading_formatting: HeadingFormatting::Flatten,
            unknown_tags: UnknownTagPolicy::Ignore,
            fallback_title: None,
        }
    }
}

impl ConvertOptions {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}
