use serde::{Deserialize, Serialize};
use std::fmt;

/// A zero-based `(line, ch)` insertion point.
///
/// `ch` counts Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub const ORIGIN: Position = Position { line: 0, ch: 0 };

    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }

    /// Where the cursor lands after `text` is inserted at `self`.
    pub fn advanced_over(self, text: &str) -> Self {
        let mut pos = self;
        for c in text.chars() {
            if c == '\n' {
                pos.line += 1;
                pos.ch = 0;
            } else {
                pos.ch += 1;
            }
        }
        pos
    }

    /// Start of the line `lines` below this one.
    pub fn line_start_below(self, lines: usize) -> Self {
        Self {
            line: self.line + lines,
            ch: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.ch)
    }
}

impl From<(usize, usize)> for Position {
    fn from((line, ch): (usize, usize)) -> Self {
        Self { line, ch }
    }
}
