//! The editor surface the typewriter drives.
//!
//! The real buffer belongs to the host application. The engine only needs
//! whole-document get/set, cursor get/set, and "insert text at a position
//! without moving the cursor". `MemoryEditor` is a line-indexed in-memory
//! implementation used by the terminal bridge and the tests.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::position::Position;

/// A host buffer shared between the engine and whoever else holds it.
pub type SharedHost<H> = Arc<Mutex<H>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("editor buffer is closed")]
    Closed,
    #[error("position {0} is outside the document")]
    InvalidPosition(Position),
}

/// Boundary surface consumed from the host editor.
pub trait EditorHost: Send {
    /// Full current text.
    fn get_value(&self) -> Result<String, HostError>;

    /// Replace the full content.
    fn set_value(&mut self, text: &str) -> Result<(), HostError>;

    fn get_cursor(&self) -> Result<Position, HostError>;

    fn set_cursor(&mut self, pos: Position) -> Result<(), HostError>;

    /// Insert `text` at `at`. Must not move the visible cursor.
    fn replace_range(&mut self, text: &str, at: Position) -> Result<(), HostError>;
}

/// In-memory editor buffer.
#[derive(Debug, Clone)]
pub struct MemoryEditor {
    lines: Vec<String>,
    cursor: Position,
    closed: bool,
}

impl Default for MemoryEditor {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Position::ORIGIN,
            closed: false,
        }
    }
}

impl MemoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        let mut editor = Self::default();
        editor.load(text);
        editor
    }

    /// Wrap into the shared handle the engine consumes.
    pub fn shared(self) -> SharedHost<Self> {
        Arc::new(Mutex::new(self))
    }

    /// Simulate the host closing the buffer: every later call fails.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Content regardless of the closed flag (for rendering and asserts).
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    fn load(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
    }

    fn ensure_open(&self) -> Result<(), HostError> {
        if self.closed {
            Err(HostError::Closed)
        } else {
            Ok(())
        }
    }

    fn line_len(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(|l| l.chars().count())
    }

    fn check(&self, pos: Position) -> Result<(), HostError> {
        match self.line_len(pos.line) {
            Some(len) if pos.ch <= len => Ok(()),
            _ => Err(HostError::InvalidPosition(pos)),
        }
    }

    fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.lines.len() - 1);
        let ch = pos.ch.min(self.line_len(line).unwrap_or(0));
        Position { line, ch }
    }
}

fn byte_index(line: &str, ch: usize) -> usize {
    line.char_indices()
        .nth(ch)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

impl EditorHost for MemoryEditor {
    fn get_value(&self) -> Result<String, HostError> {
        self.ensure_open()?;
        Ok(self.text())
    }

    fn set_value(&mut self, text: &str) -> Result<(), HostError> {
        self.ensure_open()?;
        self.load(text);
        self.cursor = self.clamp(self.cursor);
        Ok(())
    }

    fn get_cursor(&self) -> Result<Position, HostError> {
        self.ensure_open()?;
        Ok(self.cursor)
    }

    fn set_cursor(&mut self, pos: Position) -> Result<(), HostError> {
        self.ensure_open()?;
        self.check(pos)?;
        self.cursor = pos;
        Ok(())
    }

    fn replace_range(&mut self, text: &str, at: Position) -> Result<(), HostError> {
        self.ensure_open()?;
        self.check(at)?;

        let line = &self.lines[at.line];
        let split = byte_index(line, at.ch);
        let (head, tail) = line.split_at(split);
        let joined = format!("{head}{text}{tail}");

        let replacement: Vec<String> = joined.split('\n').map(str::to_string).collect();
        self.lines.splice(at.line..=at.line, replacement);
        Ok(())
    }
}
