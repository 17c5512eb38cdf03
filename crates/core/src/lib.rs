//! Core domain types, tokenization, bilingual pairing, playback and
//! library persistence for the RSVP reader.

pub mod bilingual;
pub mod display;
pub mod error;
pub mod library;
pub mod player;
pub mod tokenize;
pub mod types;

pub use bilingual::{PairedText, Script, WordPair};
pub use display::Frame;
pub use error::{Error, Result};
pub use library::{Document, Library, Settings};
pub use player::{PlaybackState, Player};
pub use tokenize::TextTokenizer;
pub use types::{ExtractedDocument, ExtractedPage, SourceFormat};
