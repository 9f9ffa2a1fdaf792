use std::fmt;
use thiserror::Error;

/// Lifecycle of one playback run.
///
/// `Idle → RunningBlock(0) → AdvancingCursor(0) → RunningBlock(1) → … → Done`.
/// Any non-terminal state may also end in `Cancelled` or `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    RunningBlock(usize),
    AdvancingCursor(usize),
    Done,
    Cancelled,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal playback transition {from} -> {to}")]
pub struct IllegalTransition {
    pub from: PlaybackState,
    pub to: PlaybackState,
}

impl PlaybackState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PlaybackState::Done | PlaybackState::Cancelled | PlaybackState::Aborted
        )
    }

    pub fn can_transition_to(self, next: PlaybackState) -> bool {
        use PlaybackState::*;
        match (self, next) {
            (from, Cancelled | Aborted) => !from.is_terminal(),
            (Idle, RunningBlock(0)) | (Idle, Done) => true,
            (RunningBlock(i), AdvancingCursor(j)) => i == j,
            (AdvancingCursor(i), RunningBlock(j)) => j == i + 1,
            (AdvancingCursor(_), Done) => true,
            _ => false,
        }
    }

    pub fn advance(&mut self, next: PlaybackState) -> Result<(), IllegalTransition> {
        if !self.can_transition_to(next) {
            return Err(IllegalTransition {
                from: *self,
                to: next,
            });
        }
        tracing::trace!(from = %self, to = %next, "playback state");
        *self = next;
        Ok(())
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => f.write_str("idle"),
            PlaybackState::RunningBlock(i) => write!(f, "running-block({i})"),
            PlaybackState::AdvancingCursor(i) => write!(f, "advancing-cursor({i})"),
            PlaybackState::Done => f.write_str("done"),
            PlaybackState::Cancelled => f.write_str("cancelled"),
            PlaybackState::Aborted => f.write_str("aborted"),
        }
    }
}
