//! Byte-level scanning over the input buffer.
//!
//! Every character set the tree builder scans with is pure ASCII, so any
//! position the cursor stops at is also a `char` boundary.

use std::ops::Range;

/// A read position over an owned input buffer.
#[derive(Debug, Clone)]
pub struct Cursor {
    input: String,
    pos: usize,
}

impl Cursor {
    /// Start scanning at the beginning of `input`.
    #[must_use]
    pub const fn new(input: String) -> Self {
        Self { input, pos: 0 }
    }

    /// The whole buffer.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current byte offset.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Returns `true` once every byte has been consumed.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The byte at the current position, `None` past the end.
    #[must_use]
    pub fn current(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// The byte just before the current position.
    #[must_use]
    pub fn previous(&self) -> Option<u8> {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.input.as_bytes().get(i).copied())
    }

    /// Returns `true` if the current byte is `byte`.
    #[must_use]
    pub fn at(&self, byte: u8) -> bool {
        self.current() == Some(byte)
    }

    /// Step over one character.
    pub fn advance(&mut self) {
        if let Some(c) = self.input.get(self.pos..).and_then(|rest| rest.chars().next()) {
            self.pos += c.len_utf8();
        }
    }

    /// Move to an absolute offset, clamped to the buffer length.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Text between two offsets.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> &str {
        self.input.get(range).unwrap_or_default()
    }

    /// Text from `start` to the current position.
    #[must_use]
    pub fn since(&self, start: usize) -> &str {
        self.slice(start..self.pos)
    }

    fn span_while(&self, keep: impl Fn(u8) -> bool) -> usize {
        self.input.as_bytes()[self.pos..]
            .iter()
            .position(|&b| !keep(b))
            .map_or(self.input.len(), |offset| self.pos + offset)
    }

    /// Skip bytes in `set`.
    pub fn skip(&mut self, set: &[u8]) {
        self.pos = self.span_while(|b| set.contains(&b));
    }

    /// Skip bytes in `set`, returning what was skipped.
    pub fn copy_skip(&mut self, set: &[u8]) -> String {
        let start = self.pos;
        self.skip(set);
        self.since(start).to_string()
    }

    /// Copy up to (not including) the first byte in `set`, or to the end.
    pub fn copy_until(&mut self, set: &[u8]) -> String {
        let start = self.pos;
        self.pos = self.span_while(|b| !set.contains(&b));
        self.since(start).to_string()
    }

    /// Copy up to (not including) the next `byte`, or to the end.
    pub fn copy_until_char(&mut self, byte: u8) -> String {
        let start = self.pos;
        self.pos = memchr::memchr(byte, &self.input.as_bytes()[start..])
            .map_or(self.input.len(), |offset| start + offset);
        self.since(start).to_string()
    }
}
