//! Block model + segmenter.
//!
//! A "block" is one paragraph of the captured document:
//! - trimmed of surrounding whitespace
//! - terminated by exactly one `\n`
//! - replayed as a unit, with its own cursor-advance step
//!
//! The segmenter turns a document snapshot into the ordered block list.

pub mod model;
pub mod segmenter;

pub use model::Block;
pub use segmenter::{capture, reconstruct, segment};
