//! Fixed-interval RSVP playback.
//!
//! The player owns a cursor over `len` display units and advances it one unit
//! per interval while playing. Time is passed in as milliseconds from any
//! monotonic origin, so the driver decides where the clock comes from.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Slowest supported reading rate.
pub const MIN_WPM: u32 = 60;

/// Fastest supported reading rate.
pub const MAX_WPM: u32 = 1200;

/// Rate used when nothing else is configured.
pub const DEFAULT_WPM: u32 = 300;

/// Amount `faster`/`slower` change the rate by.
pub const WPM_STEP: u32 = 25;

/// Clamp a rate into the supported range.
pub fn clamp_wpm(wpm: u32) -> u32 {
    wpm.clamp(MIN_WPM, MAX_WPM)
}

/// Time each unit stays on screen at `wpm`.
pub fn interval_for(wpm: u32) -> Duration {
    Duration::from_millis(60_000 / u64::from(clamp_wpm(wpm)))
}

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Paused,
    Playing,
    /// Advanced past the last unit; the cursor stays on it.
    Finished,
}

/// Cursor plus repeating timer over a sequence of display units.
#[derive(Debug, Clone)]
pub struct Player {
    len: usize,
    cursor: usize,
    wpm: u32,
    state: PlaybackState,
    /// Deadline of the next advance while playing.
    next_due_ms: Option<u64>,
}

impl Player {
    /// Create a paused player over `len` units starting at `position`.
    pub fn new(len: usize, position: usize, wpm: u32) -> Self {
        Self {
            len,
            cursor: position.min(len.saturating_sub(1)),
            wpm: clamp_wpm(wpm),
            state: PlaybackState::Paused,
            next_due_ms: None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the unit currently shown.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_finished(&self) -> bool {
        self.state == PlaybackState::Finished
    }

    /// Time each unit stays on screen.
    pub fn interval(&self) -> Duration {
        interval_for(self.wpm)
    }

    fn interval_ms(&self) -> u64 {
        self.interval().as_millis() as u64
    }

    /// Start the timer. The first advance happens one interval from `now_ms`.
    ///
    /// Playing a finished sequence starts over from the beginning.
    pub fn play(&mut self, now_ms: u64) {
        if self.is_empty() || self.is_playing() {
            return;
        }
        if self.is_finished() {
            self.cursor = 0;
        }
        self.state = PlaybackState::Playing;
        self.next_due_ms = Some(now_ms + self.interval_ms());
    }

    /// Stop the timer, keeping the cursor where it is.
    pub fn pause(&mut self) {
        if self.is_playing() {
            self.state = PlaybackState::Paused;
        }
        self.next_due_ms = None;
    }

    /// Play if paused or finished, pause if playing.
    pub fn toggle(&mut self, now_ms: u64) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play(now_ms);
        }
    }

    /// Advance the cursor if the current deadline has passed.
    ///
    /// Moves at most one unit per call. A driver that falls more than an
    /// interval behind is re-anchored to `now_ms` rather than skipping words.
    /// Returns whether the displayed unit or state changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let Some(due) = self.next_due_ms else {
            return false;
        };
        if !self.is_playing() || now_ms < due {
            return false;
        }

        if self.cursor + 1 >= self.len {
            self.state = PlaybackState::Finished;
            self.next_due_ms = None;
            log::debug!("Playback finished at unit {}", self.cursor);
            return true;
        }

        self.cursor += 1;
        let interval = self.interval_ms();
        let next = due + interval;
        self.next_due_ms = Some(if next <= now_ms { now_ms + interval } else { next });
        true
    }

    /// How long the driver may wait before the next `tick` is due.
    pub fn time_until_next(&self, now_ms: u64) -> Option<Duration> {
        self.next_due_ms
            .map(|due| Duration::from_millis(due.saturating_sub(now_ms)))
    }

    /// Jump to `index`, clamped to the sequence.
    ///
    /// A finished player stays finished while the cursor stays on the last unit.
    pub fn seek(&mut self, index: usize) {
        if self.is_empty() {
            return;
        }
        self.cursor = index.min(self.len - 1);
        if self.is_finished() && self.cursor < self.len - 1 {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn step_forward(&mut self) {
        self.seek(self.cursor.saturating_add(1));
    }

    pub fn step_back(&mut self) {
        self.seek(self.cursor.saturating_sub(1));
    }

    /// Rewind to the first unit and pause.
    pub fn restart(&mut self) {
        self.pause();
        self.cursor = 0;
        if self.is_finished() {
            self.state = PlaybackState::Paused;
        }
    }

    /// Change the rate. While playing, the next advance is rescheduled a
    /// full new interval from `now_ms`.
    pub fn set_wpm(&mut self, wpm: u32, now_ms: u64) {
        self.wpm = clamp_wpm(wpm);
        if self.is_playing() {
            self.next_due_ms = Some(now_ms + self.interval_ms());
        }
    }

    pub fn faster(&mut self, now_ms: u64) {
        self.set_wpm(self.wpm.saturating_add(WPM_STEP), now_ms);
    }

    pub fn slower(&mut self, now_ms: u64) {
        self.set_wpm(self.wpm.saturating_sub(WPM_STEP), now_ms);
    }

    /// Fraction of the sequence read, counting the unit on screen.
    pub fn progress(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        if self.is_finished() {
            return 1.0;
        }
        (self.cursor + 1) as f64 / self.len as f64
    }

    /// Estimated time to read the rest of the sequence at the current rate.
    pub fn remaining(&self) -> Duration {
        if self.is_empty() || self.is_finished() {
            return Duration::ZERO;
        }
        let units = (self.len - self.cursor) as u32;
        self.interval() * units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_for() {
        assert_eq!(interval_for(300), Duration::from_millis(200));
        assert_eq!(interval_for(600), Duration::from_millis(100));
        assert_eq!(interval_for(60), Duration::from_millis(1000));
        // Clamped
        assert_eq!(interval_for(0), Duration::from_millis(1000));
        assert_eq!(interval_for(100_000), Duration::from_millis(50));
    }

    #[test]
    fn test_new_clamps_position_and_wpm() {
        let player = Player::new(5, 99, 10);
        assert_eq!(player.cursor(), 4);
        assert_eq!(player.wpm(), MIN_WPM);
        assert_eq!(player.state(), PlaybackState::Paused);

        let empty = Player::new(0, 3, 300);
        assert_eq!(empty.cursor(), 0);
        assert_eq!(empty.progress(), 0.0);
    }

    #[test]
    fn test_first_advance_one_interval_after_play() {
        let mut player = Player::new(3, 0, 300);
        player.play(1_000);

        assert!(!player.tick(1_100));
        assert_eq!(player.cursor(), 0);

        assert!(player.tick(1_200));
        assert_eq!(player.cursor(), 1);

        assert!(!player.tick(1_300));
        assert!(player.tick(1_400));
        assert_eq!(player.cursor(), 2);
    }

    #[test]
    fn test_tick_while_paused_does_nothing() {
        let mut player = Player::new(3, 0, 300);
        assert!(!player.tick(10_000));
        assert_eq!(player.cursor(), 0);
    }

    #[test]
    fn test_finishes_after_last_unit() {
        let mut player = Player::new(2, 0, 600);
        player.play(0);

        assert!(player.tick(100));
        assert_eq!(player.cursor(), 1);
        assert!(player.tick(200));
        assert!(player.is_finished());
        assert_eq!(player.cursor(), 1);
        assert_eq!(player.progress(), 1.0);
        assert_eq!(player.time_until_next(200), None);
        assert!(!player.tick(10_000));
    }

    #[test]
    fn test_play_after_finish_restarts() {
        let mut player = Player::new(1, 0, 600);
        player.play(0);
        player.tick(100);
        assert!(player.is_finished());

        player.play(500);
        assert!(player.is_playing());
        assert_eq!(player.cursor(), 0);
    }

    #[test]
    fn test_late_driver_does_not_skip_words() {
        let mut player = Player::new(10, 0, 600);
        player.play(0);

        // Driver stalls for a full second
        assert!(player.tick(1_000));
        assert_eq!(player.cursor(), 1);
        assert_eq!(player.time_until_next(1_000), Some(Duration::from_millis(100)));

        assert!(!player.tick(1_050));
        assert!(player.tick(1_100));
        assert_eq!(player.cursor(), 2);
    }

    #[test]
    fn test_slightly_late_tick_keeps_cadence() {
        let mut player = Player::new(10, 0, 600);
        player.play(0);

        assert!(player.tick(130));
        // Next deadline stays on the original grid
        assert_eq!(player.time_until_next(130), Some(Duration::from_millis(70)));
    }

    #[test]
    fn test_pause_and_toggle() {
        let mut player = Player::new(5, 0, 300);
        player.toggle(0);
        assert!(player.is_playing());

        player.toggle(50);
        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(player.time_until_next(50), None);
        assert!(!player.tick(1_000));
    }

    #[test]
    fn test_empty_player_never_plays() {
        let mut player = Player::new(0, 0, 300);
        player.play(0);
        assert_eq!(player.state(), PlaybackState::Paused);
        player.step_forward();
        assert_eq!(player.cursor(), 0);
        assert_eq!(player.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_navigation() {
        let mut player = Player::new(5, 2, 300);

        player.step_forward();
        assert_eq!(player.cursor(), 3);
        player.step_back();
        player.step_back();
        assert_eq!(player.cursor(), 1);

        player.seek(100);
        assert_eq!(player.cursor(), 4);

        player.restart();
        assert_eq!(player.cursor(), 0);
        player.step_back();
        assert_eq!(player.cursor(), 0);
    }

    #[test]
    fn test_seek_out_of_finished_pauses() {
        let mut player = Player::new(2, 1, 600);
        player.play(0);
        player.tick(100);
        assert!(player.is_finished());

        player.step_back();
        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(player.cursor(), 0);
    }

    #[test]
    fn test_seek_to_last_unit_stays_finished() {
        let mut player = Player::new(3, 2, 600);
        player.play(0);
        player.tick(100);
        assert!(player.is_finished());

        player.step_forward();
        assert!(player.is_finished());
        player.seek(50);
        assert!(player.is_finished());
        assert_eq!(player.cursor(), 2);
        assert_eq!(player.progress(), 1.0);
    }

    #[test]
    fn test_restart_single_unit_leaves_finished() {
        let mut player = Player::new(1, 0, 600);
        player.play(0);
        player.tick(100);
        assert!(player.is_finished());

        player.restart();
        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(player.cursor(), 0);
    }

    #[test]
    fn test_rate_change_reschedules() {
        let mut player = Player::new(10, 0, 300);
        player.play(0);

        player.faster(150);
        assert_eq!(player.wpm(), 325);
        // 60000 / 325 = 184ms from the change
        assert_eq!(player.time_until_next(150), Some(Duration::from_millis(184)));

        player.set_wpm(5_000, 200);
        assert_eq!(player.wpm(), MAX_WPM);
        player.set_wpm(0, 200);
        assert_eq!(player.wpm(), MIN_WPM);
    }

    #[test]
    fn test_slower_saturates_at_minimum() {
        let mut player = Player::new(10, 0, MIN_WPM + 10);
        player.slower(0);
        assert_eq!(player.wpm(), MIN_WPM);
        player.slower(0);
        assert_eq!(player.wpm(), MIN_WPM);
    }

    #[test]
    fn test_progress_and_remaining() {
        let player = Player::new(4, 1, 600);
        assert_eq!(player.progress(), 0.5);
        // Three units left at 100ms each
        assert_eq!(player.remaining(), Duration::from_millis(300));
    }
}
