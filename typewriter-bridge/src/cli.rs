//! Command-line interface.

use clap::Parser;
use std::path::PathBuf;
use typewriter_core::Strategy;

/// Replays a text file as if it were being typed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Parser)]
#[command(name = "typewriter", author, version, about, long_about = None)]
pub struct CliArgs {
    /// File to replay
    pub input: PathBuf,

    /// JSON config file (default: <config dir>/typewriter/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// "random", "<ms>" per keystroke, or "<min>-<max>" ms
    #[arg(long)]
    pub speed: Option<String>,

    /// Marker wrapping atomic spans (default: =h=)
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Insert atomic spans without their markers
    #[arg(long)]
    pub strip: bool,

    /// Schedule every keystroke on its own timer
    #[arg(long)]
    pub timers: bool,

    /// Seed for random delays
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stream keystrokes instead of redrawing the screen
    #[arg(long)]
    pub plain: bool,
}

impl CliArgs {
    /// Strategy requested on the command line, if any.
    pub fn strategy(&self) -> Option<Strategy> {
        self.timers.then_some(Strategy::Timers)
    }
}
