//! Persisted document library and reader settings.
//!
//! The library is a single JSON file holding every imported document's word
//! sequence, its reading position, and the reader-wide settings. Writes go
//! through a temp file in the same directory and are renamed into place.

use crate::bilingual::{self, PairedText};
use crate::player::{clamp_wpm, DEFAULT_WPM};
use crate::{Error, ExtractedDocument, Result, TextTokenizer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// On-disk format version.
pub const LIBRARY_VERSION: u32 = 1;

/// Reader-wide preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Playback rate in words per minute.
    pub wpm: u32,

    /// Import two-script documents in bilingual mode.
    pub bilingual_by_default: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wpm: DEFAULT_WPM,
            bilingual_by_default: false,
        }
    }
}

/// An imported document and its reading state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Library-unique id. Never reused after removal.
    pub id: u64,

    pub title: String,

    /// Source filename (without path).
    pub filename: String,

    pub imported_at: DateTime<Utc>,

    pub last_read_at: Option<DateTime<Utc>>,

    /// Ordered word sequence extracted at import time.
    pub words: Vec<String>,

    /// Whether playback shows word pairs instead of single words.
    pub bilingual: bool,

    /// Index of the current unit (word, or pair in bilingual mode).
    pub position: usize,
}

impl Document {
    /// Bilingual pairs for this document, if it uses two scripts.
    pub fn paired(&self) -> Option<PairedText> {
        bilingual::pair(&self.words)
    }

    /// Number of display units in the current mode.
    pub fn units(&self) -> usize {
        if self.bilingual {
            self.paired().map_or(0, |p| p.len())
        } else {
            self.words.len()
        }
    }

    /// Fraction read, counting the unit at the current position.
    pub fn progress(&self) -> f64 {
        let units = self.units();
        if units == 0 {
            return 0.0;
        }
        (self.position.min(units - 1) + 1) as f64 / units as f64
    }

    /// Switch between word and pair playback.
    ///
    /// The position is carried over proportionally so the reader lands at
    /// roughly the same place in the text.
    pub fn set_bilingual(&mut self, on: bool) -> Result<()> {
        if on == self.bilingual {
            return Ok(());
        }

        let pairs = self.paired().map(|p| p.len());
        let (from, to) = match (on, pairs) {
            (true, Some(pairs)) => (self.words.len(), pairs),
            (true, None) => return Err(Error::NotBilingual(self.title.clone())),
            (false, pairs) => (pairs.unwrap_or(0), self.words.len()),
        };

        self.position = rescale(self.position, from, to);
        self.bilingual = on;
        Ok(())
    }

    fn clamp_position(&mut self) {
        self.position = self.position.min(self.units().saturating_sub(1));
    }
}

/// Map an index in a sequence of `from` units onto one of `to` units.
fn rescale(position: usize, from: usize, to: usize) -> usize {
    if from == 0 || to == 0 {
        return 0;
    }
    let scaled = (position as u128 * to as u128 / from as u128) as usize;
    scaled.min(to - 1)
}

/// Serialized form of the library file.
#[derive(Debug, Serialize, Deserialize)]
struct LibraryFile {
    version: u32,
    next_id: u64,
    settings: Settings,
    documents: Vec<Document>,
}

impl Default for LibraryFile {
    fn default() -> Self {
        Self {
            version: LIBRARY_VERSION,
            next_id: 1,
            settings: Settings::default(),
            documents: Vec::new(),
        }
    }
}

/// The list of imported documents, bound to its backing file.
#[derive(Debug)]
pub struct Library {
    path: PathBuf,
    data: LibraryFile,
}

impl Library {
    /// Load the library at `path`. A missing file yields an empty library.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            log::debug!("No library at {}, starting empty", path.display());
            return Ok(Self {
                path,
                data: LibraryFile::default(),
            });
        }

        let content = fs::read_to_string(&path)?;
        let mut data: LibraryFile = serde_json::from_str(&content)?;

        if data.version != LIBRARY_VERSION {
            return Err(Error::LibraryFormat(format!(
                "unsupported library version {} in {}",
                data.version,
                path.display()
            )));
        }

        data.settings.wpm = clamp_wpm(data.settings.wpm);
        for doc in &mut data.documents {
            doc.clamp_position();
        }
        if let Some(max_id) = data.documents.iter().map(|d| d.id).max() {
            let after_max = max_id.checked_add(1).ok_or_else(|| {
                Error::LibraryFormat(format!(
                    "document id {} out of range in {}",
                    max_id,
                    path.display()
                ))
            })?;
            data.next_id = data.next_id.max(after_max);
        }

        log::debug!(
            "Loaded {} documents from {}",
            data.documents.len(),
            path.display()
        );
        Ok(Self { path, data })
    }

    /// Write the library back to its file atomically.
    pub fn save(&self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let json = serde_json::to_string_pretty(&self.data)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::IoError(e.error))?;

        log::debug!("Saved library to {}", self.path.display());
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.data.settings
    }

    /// Replace the settings, clamping the rate.
    pub fn update_settings(&mut self, mut settings: Settings) {
        settings.wpm = clamp_wpm(settings.wpm);
        self.data.settings = settings;
    }

    /// Documents in import order.
    pub fn documents(&self) -> &[Document] {
        &self.data.documents
    }

    pub fn get(&self, id: u64) -> Option<&Document> {
        self.data.documents.iter().find(|d| d.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Document> {
        self.data.documents.iter_mut().find(|d| d.id == id)
    }

    fn document_mut(&mut self, id: u64) -> Result<&mut Document> {
        self.get_mut(id)
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))
    }

    /// Resolve a user query to a document id.
    ///
    /// Accepts a numeric id, an exact title (case-insensitive), or a unique
    /// title prefix.
    pub fn resolve(&self, query: &str) -> Result<u64> {
        let query = query.trim();
        if let Ok(id) = query.parse::<u64>() {
            if self.get(id).is_some() {
                return Ok(id);
            }
        }

        let needle = query.to_lowercase();
        if let Some(doc) = self
            .documents()
            .iter()
            .find(|d| d.title.to_lowercase() == needle)
        {
            return Ok(doc.id);
        }

        let matches: Vec<&Document> = self
            .documents()
            .iter()
            .filter(|d| !needle.is_empty() && d.title.to_lowercase().starts_with(&needle))
            .collect();

        match matches.as_slice() {
            [doc] => Ok(doc.id),
            [] => Err(Error::DocumentNotFound(query.to_string())),
            _ => Err(Error::DocumentNotFound(format!(
                "'{}' matches {} documents",
                query,
                matches.len()
            ))),
        }
    }

    /// Tokenize an extracted document and add it to the library.
    ///
    /// `bilingual` forces the mode; `None` follows the settings and only
    /// enables pairing when the text actually uses two scripts.
    pub fn import(
        &mut self,
        extracted: &ExtractedDocument,
        tokenizer: &TextTokenizer,
        bilingual: Option<bool>,
    ) -> Result<u64> {
        let words = tokenizer.tokenize_pages(&extracted.pages);
        self.import_words(
            extracted.display_title(),
            extracted.filename.clone(),
            words,
            bilingual,
        )
    }

    /// Add an already tokenized word sequence to the library.
    pub fn import_words(
        &mut self,
        title: impl Into<String>,
        filename: impl Into<String>,
        words: Vec<String>,
        bilingual: Option<bool>,
    ) -> Result<u64> {
        let title = title.into();
        let filename = filename.into();

        if words.is_empty() {
            return Err(Error::NoText(filename));
        }

        let pairable = bilingual::detect_scripts(&words).is_some();
        let bilingual = match bilingual {
            Some(true) if !pairable => return Err(Error::NotBilingual(title)),
            Some(on) => on,
            None => self.data.settings.bilingual_by_default && pairable,
        };

        let id = self.data.next_id;
        self.data.next_id = id
            .checked_add(1)
            .ok_or_else(|| Error::LibraryFormat("no document ids left".to_string()))?;

        log::debug!(
            "Importing '{}' as #{} ({} words, bilingual: {})",
            title,
            id,
            words.len(),
            bilingual
        );

        self.data.documents.push(Document {
            id,
            title,
            filename,
            imported_at: Utc::now(),
            last_read_at: None,
            words,
            bilingual,
            position: 0,
        });

        Ok(id)
    }

    /// Remove a document, returning it.
    pub fn remove(&mut self, id: u64) -> Result<Document> {
        let idx = self
            .data
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;
        Ok(self.data.documents.remove(idx))
    }

    /// Store the reading position of a document, clamped to its length.
    pub fn record_position(&mut self, id: u64, position: usize) -> Result<()> {
        let doc = self.document_mut(id)?;
        doc.position = position;
        doc.clamp_position();
        doc.last_read_at = Some(Utc::now());
        Ok(())
    }

    /// Rewind a document to its first unit.
    pub fn reset(&mut self, id: u64) -> Result<()> {
        self.document_mut(id)?.position = 0;
        Ok(())
    }

    /// Switch a document between word and pair playback.
    pub fn set_bilingual(&mut self, id: u64, on: bool) -> Result<()> {
        self.document_mut(id)?.set_bilingual(on)
    }
}
