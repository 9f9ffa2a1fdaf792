//! Block model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One paragraph of a document snapshot, always ending in `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block(String);

impl Block {
    /// Normalizes a raw fragment: trims it and re-appends a single newline.
    pub fn from_fragment(fragment: &str) -> Self {
        let mut text = fragment.trim().to_string();
        text.push('\n');
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of lines the cursor drops after replaying this block.
    pub fn newline_count(&self) -> usize {
        self.0.matches('\n').count()
    }

    /// Length in characters (the unit the cursor column counts in).
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// True for the degenerate `"\n"` block.
    pub fn is_blank(&self) -> bool {
        self.0 == "\n"
    }
}

impl AsRef<str> for Block {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Block {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
