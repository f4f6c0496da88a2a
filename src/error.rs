//! Errors raised outside the conversion core: reading files, parsing XML
//! text and writing JSON. The conversion itself never fails.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input text is not well-formed XML.
    #[error("XML parsing error: {0}")]
    Xml(String),

    #[error("document has no root element")]
    NoRootElement,

    #[error("KMZ archive error: {0}")]
    Kmz(#[from] zip::result::ZipError),

    /// A KMZ archive without a `.kml` entry.
    #[error("no KML document in {0}")]
    NoKmlInArchive(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Path is neither a KML/KMZ file nor a directory.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
