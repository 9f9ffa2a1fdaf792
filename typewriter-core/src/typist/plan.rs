//! The playback plan: every keystroke of a run, computed up front.
//!
//! Both schedulers replay the same plan, so the sequence of insertions and
//! the cursor math never depend on timing.

use rand::Rng;
use std::time::Duration;

use crate::blocks::Block;
use crate::config::{ConfigError, TypewriterConfig};
use crate::position::Position;
use crate::spans::{self, Segment};

/// One insertion unit: a plain character or a whole atomic span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keystroke {
    pub block: usize,
    pub text: String,
    /// Insertion point.
    pub at: Position,
    /// Cursor after the insertion.
    pub after: Position,
    /// Wait after this keystroke.
    pub delay: Duration,
    pub atomic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPlan {
    pub index: usize,
    pub origin: Position,
    /// Start of the line following the block.
    pub end: Position,
    pub keystrokes: Vec<Keystroke>,
}

impl BlockPlan {
    pub fn duration(&self) -> Duration {
        self.keystrokes.iter().map(|k| k.delay).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackPlan {
    pub start: Position,
    pub initial_delay: Duration,
    pub blocks: Vec<BlockPlan>,
}

impl PlaybackPlan {
    /// Fails if `config` does not validate; delays are drawn from `rng`.
    pub fn build<R: Rng + ?Sized>(
        blocks: &[Block],
        start: Position,
        config: &TypewriterConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut cursor = start;
        let mut planned = Vec::with_capacity(blocks.len());

        for (index, block) in blocks.iter().enumerate() {
            let origin = cursor;
            let mut keystrokes = Vec::with_capacity(block.char_len());

            for segment in spans::scan(block.as_str(), &config.delimiter) {
                match &segment {
                    Segment::Plain(text) => {
                        for c in text.chars() {
                            let text = c.to_string();
                            let after = cursor.advanced_over(&text);
                            keystrokes.push(Keystroke {
                                block: index,
                                text,
                                at: cursor,
                                after,
                                delay: config.delay.next_delay(rng),
                                atomic: false,
                            });
                            cursor = after;
                        }
                    }
                    Segment::Atomic { .. } => {
                        let text = segment.insert_text(config.strip_delimiters);
                        if text.is_empty() {
                            continue;
                        }
                        let after = cursor.advanced_over(text);
                        let delay = if config.delay_after_span {
                            config.delay.next_delay(rng)
                        } else {
                            Duration::ZERO
                        };
                        keystrokes.push(Keystroke {
                            block: index,
                            text: text.to_string(),
                            at: cursor,
                            after,
                            delay,
                            atomic: true,
                        });
                        cursor = after;
                    }
                }
            }

            let newlines: usize = keystrokes.iter().map(|k| k.text.matches('\n').count()).sum();
            let end = origin.line_start_below(newlines);
            cursor = end;

            planned.push(BlockPlan {
                index,
                origin,
                end,
                keystrokes,
            });
        }

        Ok(Self {
            start,
            initial_delay: config.delay.initial(),
            blocks: planned,
        })
    }

    pub fn keystrokes(&self) -> impl Iterator<Item = &Keystroke> {
        self.blocks.iter().flat_map(|b| b.keystrokes.iter())
    }

    pub fn keystroke_count(&self) -> usize {
        self.blocks.iter().map(|b| b.keystrokes.len()).sum()
    }

    /// Wall time of a full run, including the initial wait.
    pub fn total_delay(&self) -> Duration {
        self.initial_delay + self.blocks.iter().map(BlockPlan::duration).sum::<Duration>()
    }

    /// Absolute offset of every keystroke from run start, in plan order.
    ///
    /// Keystroke `i` fires at `initial_delay + Σ delay[0..i]`; with a fixed
    /// policy that is `base + i * increment`, and each block starts where
    /// the previous block's schedule ended.
    pub fn offsets(&self) -> Vec<Duration> {
        let mut at = self.initial_delay;
        self.keystrokes()
            .map(|k| {
                let offset = at;
                at += k.delay;
                offset
            })
            .collect()
    }

    /// Cursor once every keystroke has been inserted.
    pub fn final_cursor(&self) -> Position {
        self.blocks.last().map(|b| b.end).unwrap_or(self.start)
    }

    /// Cursor after the first `inserted` keystrokes.
    pub fn cursor_after(&self, inserted: usize) -> Position {
        match inserted.checked_sub(1) {
            None => self.start,
            Some(last) => self
                .keystrokes()
                .nth(last)
                .map(|k| k.after)
                .unwrap_or_else(|| self.final_cursor()),
        }
    }

    /// The text a complete run leaves in an initially empty buffer.
    pub fn rendered(&self) -> String {
        self.keystrokes().map(|k| k.text.as_str()).collect()
    }
}
