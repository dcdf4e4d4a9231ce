use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that reach the caller of the conversion and persistence APIs.
///
/// Empty tables, unknown tags and anchors without an `href` are handled
/// inside the converter and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid options: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }
}
