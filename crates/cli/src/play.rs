//! Full-screen terminal playback.

use anyhow::Result;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use rsvp_core::display::{status_line, Frame};
use rsvp_core::{Document, Library, PairedText, PlaybackState, Player, Settings};
use std::io::{stdout, Stdout, Write};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

/// Poll timeout while nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

const HELP: &str = "space play/pause · ←/→ step · ↑/↓ speed · b bilingual · r restart · q quit";

/// Raw-mode alternate screen, restored on drop.
struct TerminalSession {
    out: Stdout,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        Ok(Self { out })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// What a key press asks the reader to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Toggle,
    Back,
    Forward,
    Faster,
    Slower,
    Restart,
    ToggleBilingual,
    Quit,
}

fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Char(' ') => Some(Action::Toggle),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::Back),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::Forward),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Faster),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Slower),
        KeyCode::Char('r') => Some(Action::Restart),
        KeyCode::Char('b') => Some(Action::ToggleBilingual),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// The display units of one document in its current mode.
struct ReaderView {
    title: String,
    words: Vec<String>,
    pairs: Option<PairedText>,
}

impl ReaderView {
    fn new(doc: &Document) -> Self {
        let pairs = if doc.bilingual { doc.paired() } else { None };
        Self {
            title: doc.title.clone(),
            words: doc.words.clone(),
            pairs,
        }
    }

    fn units(&self) -> usize {
        match &self.pairs {
            Some(pairs) => pairs.len(),
            None => self.words.len(),
        }
    }

    fn frame(&self, cursor: usize) -> Frame<'_> {
        match &self.pairs {
            Some(pairs) => Frame::for_pair(&pairs.pairs, cursor),
            None => Frame::for_word(&self.words, cursor),
        }
    }
}

/// Reading session for one library document.
struct Reader<'a> {
    library: &'a mut Library,
    id: u64,
    view: ReaderView,
    player: Player,
    message: Option<String>,
}

impl<'a> Reader<'a> {
    fn new(library: &'a mut Library, id: u64, wpm: u32) -> Result<Self> {
        let doc = library
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("Document #{} not found", id))?;
        let view = ReaderView::new(doc);
        let player = Player::new(view.units(), doc.position, wpm);

        Ok(Self {
            library,
            id,
            view,
            player,
            message: None,
        })
    }

    /// Persist the position and rate.
    fn save(&mut self) -> Result<()> {
        self.library.record_position(self.id, self.player.cursor())?;
        let settings = Settings {
            wpm: self.player.wpm(),
            ..self.library.settings().clone()
        };
        self.library.update_settings(settings);
        self.library.save()?;
        Ok(())
    }

    /// Save without leaving the screen; failures are shown instead of raised.
    fn checkpoint(&mut self) {
        if let Err(e) = self.save() {
            log::warn!("Failed to save reading position: {}", e);
            self.message = Some(format!("Save failed: {}", e));
        }
    }

    /// Apply an action. Returns false when the reader should close.
    fn handle(&mut self, action: Action, now_ms: u64) -> bool {
        self.message = None;
        match action {
            Action::Toggle => {
                self.player.toggle(now_ms);
                if !self.player.is_playing() {
                    self.checkpoint();
                }
            }
            Action::Back => self.player.step_back(),
            Action::Forward => self.player.step_forward(),
            Action::Faster => self.player.faster(now_ms),
            Action::Slower => self.player.slower(now_ms),
            Action::Restart => self.player.restart(),
            Action::ToggleBilingual => self.toggle_bilingual(),
            Action::Quit => return false,
        }
        true
    }

    fn toggle_bilingual(&mut self) {
        self.player.pause();
        if let Err(e) = self.library.record_position(self.id, self.player.cursor()) {
            self.message = Some(e.to_string());
            return;
        }

        let on = self.view.pairs.is_none();
        if let Err(e) = self.library.set_bilingual(self.id, on) {
            self.message = Some(e.to_string());
            return;
        }

        if let Some(doc) = self.library.get(self.id) {
            self.view = ReaderView::new(doc);
            self.player = Player::new(self.view.units(), doc.position, self.player.wpm());
        }
        self.checkpoint();
    }

    fn draw(&self, out: &mut Stdout) -> Result<()> {
        let (width, height) = terminal::size()?;
        let mid = height / 2;

        queue!(out, Clear(ClearType::All))?;
        print_centered(out, &self.view.title, width, 0, false)?;

        let frame = self.view.frame(self.player.cursor());
        let lines = frame.lines();
        let top = mid.saturating_sub(lines.len() as u16 / 2);
        for (i, line) in lines.iter().enumerate() {
            // Secondary line sits one blank row below the primary
            let row = top + (i as u16) * 2;
            print_centered(out, line, width, row, i == 0)?;
        }

        let state = match self.player.state() {
            PlaybackState::Playing => "▶",
            PlaybackState::Paused => "❚❚",
            PlaybackState::Finished => "■",
        };
        let status = match &self.message {
            Some(message) => format!("{} {} · {}", state, status_line(&self.player), message),
            None => format!("{} {}", state, status_line(&self.player)),
        };
        print_centered(out, &status, width, height.saturating_sub(2), false)?;
        print_centered(out, HELP, width, height.saturating_sub(1), false)?;

        out.flush()?;
        Ok(())
    }
}

/// Column that centers `text` in `width` terminal cells.
fn centered_column(text: &str, width: u16) -> u16 {
    let cells = u16::try_from(text.width()).unwrap_or(u16::MAX);
    width.saturating_sub(cells) / 2
}

fn print_centered(out: &mut Stdout, text: &str, width: u16, row: u16, bold: bool) -> Result<()> {
    queue!(out, MoveTo(centered_column(text, width), row))?;
    if bold {
        queue!(out, SetAttribute(Attribute::Bold), Print(text), SetAttribute(Attribute::Reset))?;
    } else {
        queue!(out, Print(text))?;
    }
    Ok(())
}

/// Read a library document in the terminal until the user quits.
pub fn run(library: &mut Library, id: u64, wpm: u32, from: Option<usize>) -> Result<()> {
    let mut reader = Reader::new(library, id, wpm)?;
    if let Some(from) = from {
        reader.player.seek(from);
    }

    let mut session = TerminalSession::new()?;
    let start = Instant::now();
    let now_ms = || start.elapsed().as_millis() as u64;

    reader.draw(&mut session.out)?;

    loop {
        let timeout = reader
            .player
            .time_until_next(now_ms())
            .unwrap_or(IDLE_POLL);

        let mut redraw = false;
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if let Some(action) = action_for(key) {
                    if !reader.handle(action, now_ms()) {
                        break;
                    }
                    redraw = true;
                }
            } else {
                // Resize and other events
                redraw = true;
            }
        }

        if reader.player.tick(now_ms()) {
            redraw = true;
            if reader.player.is_finished() {
                reader.checkpoint();
            }
        }

        if redraw {
            reader.draw(&mut session.out)?;
        }
    }

    drop(session);
    reader.save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use tempfile::TempDir;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(action_for(press(KeyCode::Char(' '))), Some(Action::Toggle));
        assert_eq!(action_for(press(KeyCode::Left)), Some(Action::Back));
        assert_eq!(action_for(press(KeyCode::Char('l'))), Some(Action::Forward));
        assert_eq!(action_for(press(KeyCode::Up)), Some(Action::Faster));
        assert_eq!(action_for(press(KeyCode::Char('j'))), Some(Action::Slower));
        assert_eq!(action_for(press(KeyCode::Char('b'))), Some(Action::ToggleBilingual));
        assert_eq!(action_for(press(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(action_for(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action_for(key), Some(Action::Quit));
    }

    #[test]
    fn test_key_release_ignored() {
        let key = KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(action_for(key), None);
    }

    #[test]
    fn test_centering_uses_display_width() {
        assert_eq!(centered_column("cat", 80), 38);
        // Wide characters take two cells each
        assert_eq!(centered_column("垫子上", 80), 37);
        assert_eq!(centered_column("고양이", 80), 37);
    }

    #[test]
    fn test_centering_overlong_text() {
        assert_eq!(centered_column(&"x".repeat(200), 80), 0);
        assert_eq!(centered_column(&"x".repeat(70_000), 80), 0);
    }

    #[test]
    fn test_reader_view_units_follow_mode() {
        let dir = TempDir::new().unwrap();
        let mut library = Library::load(dir.path().join("library.json")).unwrap();
        let words = ["a", "b", "c", "甲", "乙"].map(String::from).to_vec();
        let id = library
            .import_words("Mixed", "m.pdf", words, Some(true))
            .unwrap();

        let view = ReaderView::new(library.get(id).unwrap());
        assert_eq!(view.units(), 3);
        assert_eq!(view.frame(0).lines(), vec!["a", "甲"]);

        library.set_bilingual(id, false).unwrap();
        let view = ReaderView::new(library.get(id).unwrap());
        assert_eq!(view.units(), 5);
        assert_eq!(view.frame(4).lines(), vec!["乙"]);
    }
}
