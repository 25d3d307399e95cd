use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Error type covering the different failure cases that can occur when the
/// tool ingests a statistics document or emits a workbook.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the XML source is not well formed.
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when a required element is absent from the document.
    #[error("missing element '{path}'")]
    MissingElement { path: String },

    /// Raised when a required attribute is absent from an element.
    #[error("missing attribute '{attribute}' on element '{path}'")]
    MissingAttribute { path: String, attribute: String },

    /// Raised when an attribute value fails integer parsing.
    #[error("invalid value '{value}' for attribute '{attribute}' on element '{path}'")]
    InvalidAttribute {
        path: String,
        attribute: String,
        value: String,
    },

    /// Raised when a sheet table arrives without even a header row.
    #[error("sheet '{0}' has no rows; at least a header row is required")]
    EmptyTable(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
