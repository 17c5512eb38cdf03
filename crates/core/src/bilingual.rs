//! Bilingual word pairing for documents that interleave two scripts.
//!
//! A parallel text (for example English followed by its Chinese translation)
//! is split into two word streams by Unicode script, padded to equal length,
//! and read back as index-aligned pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Writing system of a character, classified by Unicode block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Script {
    Latin,
    Greek,
    Cyrillic,
    Hebrew,
    Arabic,
    Devanagari,
    Thai,
    Hangul,
    /// Hiragana and Katakana.
    Kana,
    /// CJK ideographs.
    Han,
}

impl Script {
    /// Classify a single character. Digits, punctuation and symbols are neutral.
    pub fn of_char(c: char) -> Option<Self> {
        if !c.is_alphabetic() {
            return None;
        }

        let script = match c as u32 {
            0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F | 0x1E00..=0x1EFF => {
                Script::Latin
            }
            0x0370..=0x03FF | 0x1F00..=0x1FFF => Script::Greek,
            0x0400..=0x052F => Script::Cyrillic,
            0x0590..=0x05FF => Script::Hebrew,
            0x0600..=0x06FF | 0x0750..=0x077F => Script::Arabic,
            0x0900..=0x097F => Script::Devanagari,
            0x0E00..=0x0E7F => Script::Thai,
            0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7AF => Script::Hangul,
            0x3040..=0x30FF => Script::Kana,
            0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2FA1F => {
                Script::Han
            }
            _ => return None,
        };

        Some(script)
    }

    /// Script of a word: the script of its first classified character.
    pub fn of_word(word: &str) -> Option<Self> {
        word.chars().find_map(Self::of_char)
    }

    /// The family used when pairing. Japanese mixes kana and kanji, so both
    /// count as one family.
    pub fn family(self) -> Self {
        match self {
            Script::Kana => Script::Han,
            other => other,
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Script::Latin => "Latin",
            Script::Greek => "Greek",
            Script::Cyrillic => "Cyrillic",
            Script::Hebrew => "Hebrew",
            Script::Arabic => "Arabic",
            Script::Devanagari => "Devanagari",
            Script::Thai => "Thai",
            Script::Hangul => "Hangul",
            Script::Kana => "Kana",
            Script::Han => "CJK",
        };
        f.write_str(name)
    }
}

/// One display unit in bilingual mode.
///
/// Either side may be empty where one stream was padded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub primary: String,
    pub secondary: String,
}

impl WordPair {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

/// The two index-aligned word streams of a bilingual document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedText {
    /// Family of the first classified word.
    pub primary_script: Script,

    /// Family split out into the second stream.
    pub secondary_script: Script,

    /// Pairs in reading order.
    pub pairs: Vec<WordPair>,
}

impl PairedText {
    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Get the pair at `index`.
    pub fn get(&self, index: usize) -> Option<&WordPair> {
        self.pairs.get(index)
    }

    /// Words of the primary stream, padding included.
    pub fn primary_stream(&self) -> Vec<&str> {
        self.pairs.iter().map(|p| p.primary.as_str()).collect()
    }

    /// Words of the secondary stream, padding included.
    pub fn secondary_stream(&self) -> Vec<&str> {
        self.pairs.iter().map(|p| p.secondary.as_str()).collect()
    }

    /// Flatten to `[p0, s0, p1, s1, ...]`, skipping padding.
    pub fn interleaved(&self) -> Vec<&str> {
        self.pairs
            .iter()
            .flat_map(|p| [p.primary.as_str(), p.secondary.as_str()])
            .filter(|w| !w.is_empty())
            .collect()
    }
}

/// Find the primary and secondary script families of a word sequence.
///
/// The primary family is that of the first classified word. The secondary is
/// the most frequent other family, ties going to whichever appeared first.
/// Returns `None` when the words use fewer than two families.
pub fn detect_scripts<S: AsRef<str>>(words: &[S]) -> Option<(Script, Script)> {
    // (family, count), in order of first appearance
    let mut counts: Vec<(Script, usize)> = Vec::new();

    for word in words {
        let Some(family) = Script::of_word(word.as_ref()).map(Script::family) else {
            continue;
        };
        match counts.iter_mut().find(|(s, _)| *s == family) {
            Some((_, count)) => *count += 1,
            None => counts.push((family, 1)),
        }
    }

    let primary = counts.first()?.0;
    let mut secondary: Option<(Script, usize)> = None;
    for &(script, count) in counts.iter().skip(1) {
        if secondary.map_or(true, |(_, best)| count > best) {
            secondary = Some((script, count));
        }
    }

    secondary.map(|(script, _)| (primary, script))
}

/// Pair a word sequence, detecting the two scripts automatically.
pub fn pair<S: AsRef<str>>(words: &[S]) -> Option<PairedText> {
    let (primary, secondary) = detect_scripts(words)?;
    log::debug!("Pairing {} words as {} / {}", words.len(), primary, secondary);
    Some(pair_with(words, primary, secondary))
}

/// Pair a word sequence with explicit script families.
///
/// Words of the secondary family go to the secondary stream and all others
/// to the primary stream. Neutral words (numbers, punctuation) follow the
/// stream of the word before them.
pub fn pair_with<S: AsRef<str>>(words: &[S], primary: Script, secondary: Script) -> PairedText {
    let primary = primary.family();
    let secondary = secondary.family();

    let mut primary_stream: Vec<String> = Vec::new();
    let mut secondary_stream: Vec<String> = Vec::new();
    let mut in_secondary = false;

    for word in words {
        let word = word.as_ref();
        if let Some(family) = Script::of_word(word).map(Script::family) {
            in_secondary = family == secondary;
        }

        if in_secondary {
            secondary_stream.push(word.to_string());
        } else {
            primary_stream.push(word.to_string());
        }
    }

    let len = primary_stream.len().max(secondary_stream.len());
    primary_stream.resize(len, String::new());
    secondary_stream.resize(len, String::new());

    let pairs = primary_stream
        .into_iter()
        .zip(secondary_stream)
        .map(|(p, s)| WordPair::new(p, s))
        .collect();

    PairedText {
        primary_script: primary,
        secondary_script: secondary,
        pairs,
    }
}
