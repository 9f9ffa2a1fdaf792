//! Atomic-span scanner.
//!
//! Splits a block into alternating plain and atomic segments in one
//! left-to-right pass. Every character of the block lands in exactly one
//! segment. An opening marker without a matching closing marker is plain
//! text for the rest of the block.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

pub const DEFAULT_MARKER: &str = "=h=";

/// The marker pair wrapping an atomic span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanDelimiter {
    open: String,
    close: String,
}

impl Default for SpanDelimiter {
    fn default() -> Self {
        Self {
            open: DEFAULT_MARKER.to_string(),
            close: DEFAULT_MARKER.to_string(),
        }
    }
}

impl SpanDelimiter {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self, ConfigError> {
        let open = open.into();
        let close = close.into();
        if open.is_empty() || close.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        Ok(Self { open, close })
    }

    /// Same marker on both ends, e.g. `=h=secret=h=`.
    pub fn symmetric(marker: impl Into<String>) -> Result<Self, ConfigError> {
        let marker = marker.into();
        Self::new(marker.clone(), marker)
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Typed one character at a time.
    Plain(String),
    /// Inserted in a single operation. `raw` includes both markers.
    Atomic { raw: String, inner: String },
}

impl Segment {
    /// Source text covered by this segment.
    pub fn raw(&self) -> &str {
        match self {
            Segment::Plain(text) => text,
            Segment::Atomic { raw, .. } => raw,
        }
    }

    /// Text that actually goes into the buffer.
    pub fn insert_text(&self, strip_delimiters: bool) -> &str {
        match self {
            Segment::Plain(text) => text,
            Segment::Atomic { inner, .. } if strip_delimiters => inner,
            Segment::Atomic { raw, .. } => raw,
        }
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self, Segment::Atomic { .. })
    }
}

/// Scan `block` for atomic spans.
pub fn scan(block: &str, delimiter: &SpanDelimiter) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut rest = block;

    while !rest.is_empty() {
        let Some(open_at) = rest.find(delimiter.open()) else {
            plain.push_str(rest);
            break;
        };

        let body_start = open_at + delimiter.open().len();
        let Some(close_rel) = rest[body_start..].find(delimiter.close()) else {
            // Unterminated: the marker and everything after it is plain text.
            plain.push_str(rest);
            break;
        };

        let close_at = body_start + close_rel;
        let span_end = close_at + delimiter.close().len();

        plain.push_str(&rest[..open_at]);
        if !plain.is_empty() {
            segments.push(Segment::Plain(std::mem::take(&mut plain)));
        }
        segments.push(Segment::Atomic {
            raw: rest[open_at..span_end].to_string(),
            inner: rest[body_start..close_at].to_string(),
        });

        rest = &rest[span_end..];
    }

    if !plain.is_empty() {
        segments.push(Segment::Plain(plain));
    }
    segments
}
