//! Text shown for the unit under the playback cursor.
//!
//! Produces the word (or word pair) to display and a one-line status summary
//! with position, rate, percentage and time left.

use crate::bilingual::WordPair;
use crate::player::Player;
use std::time::Duration;

/// What the reader shows at one cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Single-word mode.
    Word(&'a str),
    /// Bilingual mode: primary on top, secondary below.
    Pair(&'a WordPair),
    /// Nothing to show (empty document).
    Empty,
}

impl<'a> Frame<'a> {
    /// Frame for `cursor` over a plain word sequence.
    pub fn for_word(words: &'a [String], cursor: usize) -> Self {
        words
            .get(cursor)
            .map(|w| Frame::Word(w.as_str()))
            .unwrap_or(Frame::Empty)
    }

    /// Frame for `cursor` over a paired sequence.
    pub fn for_pair(pairs: &'a [WordPair], cursor: usize) -> Self {
        pairs.get(cursor).map(Frame::Pair).unwrap_or(Frame::Empty)
    }

    /// Lines to render, top to bottom.
    pub fn lines(&self) -> Vec<&'a str> {
        match *self {
            Frame::Word(word) => vec![word],
            Frame::Pair(pair) => vec![pair.primary.as_str(), pair.secondary.as_str()],
            Frame::Empty => Vec::new(),
        }
    }

    /// The frame as text, one line per entry.
    pub fn to_text(&self) -> String {
        self.lines().join("\n")
    }
}

/// Status line for a player, e.g. `42/1200 · 300 wpm · 3.5% · 3m 59s left`.
pub fn status_line(player: &Player) -> String {
    if player.is_empty() {
        return format!("0/0 · {} wpm", player.wpm());
    }

    format!(
        "{}/{} · {} wpm · {:.1}% · {} left",
        player.cursor() + 1,
        player.len(),
        player.wpm(),
        player.progress() * 100.0,
        format_duration(player.remaining())
    )
}

/// Format a duration as `Xh Ym`, `Ym Zs` or `Zs`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
