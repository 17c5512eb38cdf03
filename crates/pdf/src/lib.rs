//! PDF text extraction backend for the RSVP reader.
//!
//! Loads a PDF, pulls the text of each page in page order, and reads the
//! title from the document information dictionary.

pub mod parser;
pub mod text;

pub use parser::PdfParser;
