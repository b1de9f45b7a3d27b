//! Simulated activity log
//!
//! A bounded character buffer fed one character per tick from a cyclic pattern.

use crate::config::DEFAULT_PATTERN;

/// Buffer length that triggers truncation
pub const LOG_CEILING: usize = 1_000;
/// Characters kept after truncation
pub const LOG_RETAIN: usize = 500;

/// Activity log with its pattern cursor
#[derive(Debug, Clone)]
pub struct ActivityLog {
    pattern: Vec<char>,
    cursor: usize,
    buffer: String,
    /// Length of `buffer` in characters
    len: usize,
    /// Position a presentation layer should scroll to
    read_position: usize,
}

impl ActivityLog {
    /// An empty pattern falls back to the default text
    pub fn new(pattern: &str) -> Self {
        let pattern = if pattern.is_empty() { DEFAULT_PATTERN } else { pattern };
        Self {
            pattern: pattern.chars().collect(),
            cursor: 0,
            buffer: String::new(),
            len: 0,
            read_position: 0,
        }
    }

    /// Append the next pattern character and return it
    pub fn append_next(&mut self) -> char {
        let ch = self.pattern[self.cursor];
        self.cursor = (self.cursor + 1) % self.pattern.len();

        self.buffer.push(ch);
        self.len += 1;

        if self.len > LOG_CEILING {
            let skip = self.len - LOG_RETAIN;
            self.buffer = self.buffer.chars().skip(skip).collect();
            self.len = LOG_RETAIN;
        }

        self.read_position = self.len;
        ch
    }

    /// Clear the buffer and rewind the cursor
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.buffer.clear();
        self.len = 0;
        self.read_position = 0;
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn read_position(&self) -> usize {
        self.read_position
    }
}
