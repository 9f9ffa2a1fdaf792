pub mod blocks;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod position;
pub mod spans;
pub mod state_machine;
pub mod typist;

// Re-export the main struct so hosts can just use `typewriter_core::TypewriterEngine`
pub use engine::{RunHandle, TypewriterEngine, START_TYPEWRITER_ID, START_TYPEWRITER_NAME};

// Re-export the simpler types for hosts
pub use blocks::{segment, Block};
pub use config::{ConfigError, DelayPolicy, Strategy, TypewriterConfig};
pub use error::{EngineError, PlaybackError};
pub use host::{EditorHost, HostError, MemoryEditor, SharedHost};
pub use position::Position;
pub use spans::{scan, Segment, SpanDelimiter};
pub use typist::{CancelToken, Outcome, PlaybackPlan, PlaybackReport};

use uuid::Uuid;

pub type RunId = Uuid;

/// The event stream of a run. Hosts listen to this to know when to redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    RunStarted {
        run: RunId,
        blocks: usize,
        keystrokes: usize,
    },
    BlockStarted {
        index: usize,
        origin: Position,
    },
    Keystroke {
        block: usize,
        text: String,
        cursor: Position,
    },
    BlockFinished {
        index: usize,
        cursor: Position,
    },
    Finished(PlaybackReport),
}
