//! Error types for the xlsxforge generation engine

use thiserror::Error;

/// Result type alias for xlsxforge operations
pub type Result<T> = std::result::Result<T, XlsxError>;

/// Main error type for workbook generation
#[derive(Error, Debug)]
pub enum XlsxError {
    /// Underlying I/O failure while writing the package to disk
    #[error("failed to write xlsx file: {0}")]
    FileWrite(String),

    /// The caller-supplied data provider failed
    #[error("data provider for sheet '{sheet}' failed: {source}")]
    DataProvider {
        sheet: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Logic error while assembling XML; should be unreachable in a correct build
    #[error("internal xml generation error: {0}")]
    XmlGeneration(String),

    /// Text could not be encoded as UTF-8
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A generated part would not be valid XML (length limits, illegal characters)
    #[error("generated part '{part}' is not valid xml: {reason}")]
    XmlValidation { part: String, reason: String },

    /// The caller requested cancellation; honored at the next sheet boundary
    #[error("write cancelled")]
    Cancelled,

    /// IO error wrapper
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
