//! Terminal output for a run.
//!
//! `Plain` streams keystroke text as it arrives, which also works when
//! stdout is a pipe. `Live` redraws the buffer on the alternate screen
//! after every keystroke and leaves the final text in the scrollback.

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use typewriter_core::Position;

use crate::util::restore_terminal;

const FALLBACK_SIZE: (u16, u16) = (80, 24);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Plain,
    Live,
}

/// Lines of `text` to show so that `cursor_line` stays on screen.
///
/// Returns the index of the first visible line and the lines themselves.
pub fn visible_window(text: &str, cursor_line: usize, rows: usize) -> (usize, Vec<&str>) {
    let lines: Vec<&str> = text.split('\n').collect();
    if rows == 0 {
        return (0, Vec::new());
    }
    let first = (cursor_line + 1).saturating_sub(rows);
    let last = (first + rows).min(lines.len());
    let first = first.min(last);
    (first, lines[first..last].to_vec())
}

pub struct Renderer<W: Write> {
    out: W,
    mode: Mode,
    size: (u16, u16),
    // Alternate screen entered and not yet left.
    active: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, mode: Mode) -> Self {
        let size = match mode {
            Mode::Live => terminal::size().unwrap_or(FALLBACK_SIZE),
            Mode::Plain => FALLBACK_SIZE,
        };
        Self {
            out,
            mode,
            size,
            active: false,
        }
    }

    pub fn with_size(mut self, cols: u16, rows: u16) -> Self {
        self.size = (cols, rows);
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn begin(&mut self) -> io::Result<()> {
        if self.mode == Mode::Live {
            execute!(self.out, EnterAlternateScreen, Hide)?;
            self.active = true;
            self.frame("", Position::ORIGIN)?;
        }
        Ok(())
    }

    /// Plain mode: write the inserted text straight through.
    pub fn keystroke(&mut self, text: &str) -> io::Result<()> {
        if self.mode == Mode::Plain {
            self.out.write_all(text.as_bytes())?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Live mode: redraw the visible part of `text` and place the cursor.
    pub fn frame(&mut self, text: &str, cursor: Position) -> io::Result<()> {
        if self.mode != Mode::Live {
            return Ok(());
        }
        let (cols, rows) = self.size;
        let (first, lines) = visible_window(text, cursor.line, rows as usize);

        queue!(self.out, Hide, Clear(ClearType::All))?;
        for (row, line) in lines.iter().enumerate() {
            let clipped: String = line.chars().take(cols as usize).collect();
            queue!(self.out, MoveTo(0, row as u16), Print(clipped))?;
        }
        let col = cursor.ch.min(cols.saturating_sub(1) as usize) as u16;
        let row = cursor.line.saturating_sub(first) as u16;
        queue!(self.out, MoveTo(col, row), Show)?;
        self.out.flush()
    }

    /// Leave the alternate screen and print `final_text` so it survives the run.
    pub fn end(&mut self, final_text: &str) -> io::Result<()> {
        if self.mode == Mode::Live && self.active {
            execute!(self.out, LeaveAlternateScreen, Show)?;
            self.active = false;
            self.out.write_all(final_text.as_bytes())?;
            if !final_text.ends_with('\n') {
                self.out.write_all(b"\n")?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> Drop for Renderer<W> {
    fn drop(&mut self) {
        // Error paths skip `end`; restore the terminal anyway.
        if self.active {
            restore_terminal(&mut self.out);
        }
    }
}
