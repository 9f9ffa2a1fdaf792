//! Splits a document snapshot into blocks.
//!
//! Separators are runs of "newline, optional whitespace, newline", so any
//! number of blank (or whitespace-only) lines ends a paragraph. The blank
//! lines themselves are not reproduced: a replay writes the blocks back to
//! back.

use regex::Regex;
use std::sync::OnceLock;

use crate::host::{EditorHost, HostError};

use super::model::Block;

static BLANK_LINES: OnceLock<Regex> = OnceLock::new();

fn blank_lines() -> &'static Regex {
    BLANK_LINES.get_or_init(|| Regex::new(r"\n\s*\n").expect("Invalid blank-line Regex"))
}

/// Split `full_text` into ordered blocks.
///
/// Never fails; empty input yields a single `"\n"` block.
pub fn segment(full_text: &str) -> Vec<Block> {
    blank_lines()
        .split(full_text)
        .map(Block::from_fragment)
        .collect()
}

/// The normalized document a complete replay leaves in the buffer.
pub fn reconstruct(blocks: &[Block]) -> String {
    blocks.iter().map(Block::as_str).collect()
}

/// Read the host's content, clear the host, and segment what was read.
///
/// The buffer must be empty before replay begins, so this is the only
/// supported way to take a snapshot for a run.
pub fn capture<H: EditorHost + ?Sized>(host: &mut H) -> Result<Vec<Block>, HostError> {
    let all_text = host.get_value()?;
    host.set_value("")?;

    let blocks = segment(&all_text);
    tracing::debug!(
        chars = all_text.chars().count(),
        blocks = blocks.len(),
        "captured document snapshot"
    );
    Ok(blocks)
}
