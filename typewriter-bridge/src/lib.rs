//! Typewriter Bridge library target.
//!
//! Exposes the terminal host's modules for integration tests. The binary
//! entry point is in `main.rs`.

pub mod app;
pub mod cli;
pub mod render;
pub mod settings;
pub mod util;
