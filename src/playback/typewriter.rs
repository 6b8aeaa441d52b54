use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use crate::foundation::error::{PlaybackError, PlaybackResult};

/// Default reveal rate in characters per second.
pub const DEFAULT_RATE: u32 = 30;

/// Rates offered by the shell's speed control.
pub const RATE_RANGE: RangeInclusive<u32> = 10..=200;

/// Above this many characters per second, characters are batched per tick.
const SMOOTH_CHARS_PER_TICK_DIVISOR: u32 = 30;

/// Snapshot of a [`Typewriter`] for observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackState {
    /// Characters revealed so far.
    pub cursor: usize,
    /// Total characters in the source.
    pub len: usize,
    /// Characters per second.
    pub rate: u32,
    /// Whether the reveal is advancing.
    pub running: bool,
}

impl PlaybackState {
    /// Revealed fraction in `[0, 1]`; `0` for an empty source.
    pub fn progress(&self) -> f64 {
        if self.len == 0 {
            0.0
        } else {
            self.cursor as f64 / self.len as f64
        }
    }
}

/// Reveal cursor over an immutable source string.
///
/// Two states, paused and running. The cursor counts characters (not bytes), never exceeds the
/// source length and only moves backwards through [`Typewriter::reset`], [`Typewriter::load`] or a
/// restart from the end.
#[derive(Clone, Debug)]
pub struct Typewriter {
    source: Arc<str>,
    /// Byte offset just past each character.
    char_ends: Vec<usize>,
    cursor: usize,
    rate: u32,
    running: bool,
}

impl Default for Typewriter {
    fn default() -> Self {
        Self {
            source: Arc::from(""),
            char_ends: Vec::new(),
            cursor: 0,
            rate: DEFAULT_RATE,
            running: false,
        }
    }
}

impl Typewriter {
    /// An empty typewriter revealing at `rate` characters per second.
    pub fn new(rate: u32) -> PlaybackResult<Self> {
        let mut tw = Self::default();
        tw.set_rate(rate)?;
        Ok(tw)
    }

    /// Replace the source. Always resets to a paused, empty reveal.
    pub fn load(&mut self, text: impl Into<Arc<str>>) {
        let source: Arc<str> = text.into();
        self.char_ends = source.char_indices().map(|(i, c)| i + c.len_utf8()).collect();
        self.source = source;
        self.cursor = 0;
        self.running = false;
    }

    /// Full source text.
    pub fn source(&self) -> &Arc<str> {
        &self.source
    }

    /// Source length in characters.
    pub fn len(&self) -> usize {
        self.char_ends.len()
    }

    /// `true` when no source text is loaded.
    pub fn is_empty(&self) -> bool {
        self.char_ends.is_empty()
    }

    /// Characters revealed so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Characters per second.
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Whether the reveal is advancing.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Not started: nothing displayed and not running.
    pub fn is_idle(&self) -> bool {
        self.cursor == 0 && !self.running
    }

    /// Whether the whole source has been revealed.
    pub fn is_complete(&self) -> bool {
        self.cursor == self.len()
    }

    /// Currently displayed prefix `source[0..cursor]`.
    pub fn prefix(&self) -> &str {
        match self.cursor {
            0 => "",
            n => &self.source[..self.char_ends[n - 1]],
        }
    }

    /// Resume advancing. Restarts from 0 when already at the end.
    ///
    /// Returns whether the typewriter is now running; an empty source never starts.
    pub fn start(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        if self.is_complete() {
            self.cursor = 0;
        }
        self.running = true;
        true
    }

    /// Halt advancement, keeping the cursor.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Cursor back to 0, prefix cleared, paused.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.running = false;
    }

    /// Change the reveal rate without touching the cursor.
    pub fn set_rate(&mut self, rate: u32) -> PlaybackResult<()> {
        if rate == 0 {
            return Err(PlaybackError::input("playback rate must be >= 1 char/s"));
        }
        self.rate = rate;
        Ok(())
    }

    /// Characters revealed per tick: `max(1, ceil(rate / 30))`.
    pub fn chars_per_tick(&self) -> usize {
        self.rate.div_ceil(SMOOTH_CHARS_PER_TICK_DIVISOR).max(1) as usize
    }

    /// Period of the advance timer, `1000 / rate` ms.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.rate))
    }

    /// Advance one tick.
    ///
    /// Returns the new prefix when the cursor moved. Reaching the end pauses the typewriter.
    pub fn tick(&mut self) -> Option<&str> {
        if !self.running {
            return None;
        }
        let remaining = self.len() - self.cursor;
        if remaining == 0 {
            self.running = false;
            return None;
        }
        self.cursor += self.chars_per_tick().min(remaining);
        if self.is_complete() {
            self.running = false;
        }
        Some(self.prefix())
    }

    /// Observer snapshot.
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            cursor: self.cursor,
            len: self.len(),
            rate: self.rate,
            running: self.running,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/typewriter.rs"]
mod tests;
