//! Error types for the RSVP reader.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting, storing, or playing documents.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to parse the PDF file structure.
    #[error("PDF parsing error: {0}")]
    PdfError(String),

    /// The PDF is password protected.
    #[error("Encrypted PDF is not supported: {0}")]
    Encrypted(String),

    /// The document produced no readable words (e.g. a scanned PDF).
    #[error("No readable text found in {0}")]
    NoText(String),

    /// Bilingual mode was requested for a single-script document.
    #[error("Document does not contain two scripts to pair: {0}")]
    NotBilingual(String),

    /// No document with the given id or title exists in the library.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The library file could not be decoded or encoded.
    #[error("Library file error: {0}")]
    LibraryFormat(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::LibraryFormat(e.to_string())
    }
}
