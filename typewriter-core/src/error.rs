use thiserror::Error;

use crate::config::ConfigError;
use crate::host::HostError;
use crate::position::Position;
use crate::state_machine::IllegalTransition;

/// Why a playback run stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("host rejected an insertion: {0}")]
    Host(#[from] HostError),
    #[error("cursor moved outside the run (expected {expected}, found {found})")]
    CursorMoved { expected: Position, found: Position },
    #[error(transparent)]
    State(#[from] IllegalTransition),
    #[error("timer task failed: {0}")]
    Timer(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a typewriter run is already active")]
    AlreadyRunning,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not capture the document: {0}")]
    Capture(#[from] HostError),
    #[error("run task ended unexpectedly: {0}")]
    Join(String),
}
