//! The playback engine.
//!
//! - `plan`: keystroke schedule computed once per run
//! - `Typist`: sequential-await replay (the default strategy)
//! - `timers`: fire-and-forget replay with tracked timer tasks
//! - `cancel`: cooperative cancellation shared by both

pub mod cancel;
pub mod plan;
pub mod timers;

pub use cancel::CancelToken;
pub use plan::{BlockPlan, Keystroke, PlaybackPlan};
pub use timers::{PendingTimers, TimerPlayback};

use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::error::PlaybackError;
use crate::host::{EditorHost, SharedHost};
use crate::position::Position;
use crate::state_machine::PlaybackState;
use crate::PlaybackEvent;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Cancelled,
    Aborted(PlaybackError),
}

/// Summary handed back when a run reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackReport {
    pub outcome: Outcome,
    pub blocks_completed: usize,
    pub keystrokes: usize,
    pub final_cursor: Position,
}

impl PlaybackReport {
    pub fn is_done(&self) -> bool {
        self.outcome == Outcome::Done
    }
}

/// Optional event channel. Send failures (receiver dropped) are ignored.
#[derive(Debug, Clone, Default)]
pub struct EventSink(Option<mpsc::UnboundedSender<PlaybackEvent>>);

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<PlaybackEvent>) -> Self {
        Self(Some(tx))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn emit(&self, event: PlaybackEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}

/// Sequential-await replay.
///
/// Each keystroke is inserted, then its delay is awaited before the next
/// one is considered. The host lock is only held for the insertion itself,
/// so the host stays usable between keystrokes. A run can be cancelled at
/// any delay boundary.
pub struct Typist<H: EditorHost> {
    host: SharedHost<H>,
    cancel: CancelToken,
    events: EventSink,
    state: PlaybackState,
    /// Cursor we last set on the host.
    expected: Position,
    inserted: usize,
    blocks_completed: usize,
}

impl<H: EditorHost> Typist<H> {
    pub fn new(host: SharedHost<H>, cancel: CancelToken, events: EventSink) -> Self {
        Self {
            host,
            cancel,
            events,
            state: PlaybackState::Idle,
            expected: Position::ORIGIN,
            inserted: 0,
            blocks_completed: 0,
        }
    }

    /// Replay `plan` into the host buffer.
    pub async fn play(mut self, plan: &PlaybackPlan) -> PlaybackReport {
        info!(
            blocks = plan.blocks.len(),
            keystrokes = plan.keystroke_count(),
            "typist started"
        );

        let outcome = match self.run(plan).await {
            Ok(true) => {
                self.finish(PlaybackState::Done);
                Outcome::Done
            }
            Ok(false) => {
                self.finish(PlaybackState::Cancelled);
                info!(inserted = self.inserted, "typist cancelled");
                Outcome::Cancelled
            }
            Err(e) => {
                self.finish(PlaybackState::Aborted);
                warn!(error = %e, inserted = self.inserted, "typist aborted");
                Outcome::Aborted(e)
            }
        };

        PlaybackReport {
            outcome,
            blocks_completed: self.blocks_completed,
            keystrokes: self.inserted,
            final_cursor: self.expected,
        }
    }

    /// `Ok(true)` when every block was replayed, `Ok(false)` when cancelled.
    async fn run(&mut self, plan: &PlaybackPlan) -> Result<bool, PlaybackError> {
        self.host.lock().await.set_cursor(plan.start)?;
        self.expected = plan.start;

        if plan.blocks.is_empty() {
            self.state.advance(PlaybackState::Done)?;
            return Ok(true);
        }

        if !self.pause(plan.initial_delay).await {
            return Ok(false);
        }

        for block in &plan.blocks {
            self.state.advance(PlaybackState::RunningBlock(block.index))?;
            debug!(block = block.index, origin = %block.origin, "block started");
            self.events.emit(PlaybackEvent::BlockStarted {
                index: block.index,
                origin: block.origin,
            });

            for keystroke in &block.keystrokes {
                if !self.insert(keystroke).await? {
                    return Ok(false);
                }
                if !self.pause(keystroke.delay).await {
                    return Ok(false);
                }
            }

            self.state.advance(PlaybackState::AdvancingCursor(block.index))?;
            self.move_cursor(block.end).await?;
            self.blocks_completed += 1;
            debug!(block = block.index, cursor = %block.end, "block finished");
            self.events.emit(PlaybackEvent::BlockFinished {
                index: block.index,
                cursor: block.end,
            });
        }

        self.state.advance(PlaybackState::Done)?;
        Ok(true)
    }

    /// Insert one keystroke. `Ok(false)` if cancelled before inserting.
    async fn insert(&mut self, keystroke: &Keystroke) -> Result<bool, PlaybackError> {
        if self.cancel.is_cancelled() {
            return Ok(false);
        }

        let mut host = self.host.lock().await;
        // Cancellation may have landed while waiting for the lock.
        if self.cancel.is_cancelled() {
            return Ok(false);
        }

        let found = host.get_cursor()?;
        if found != self.expected {
            return Err(PlaybackError::CursorMoved {
                expected: self.expected,
                found,
            });
        }

        host.replace_range(&keystroke.text, keystroke.at)?;
        host.set_cursor(keystroke.after)?;
        drop(host);

        self.expected = keystroke.after;
        self.inserted += 1;
        trace!(text = ?keystroke.text, cursor = %keystroke.after, "keystroke");
        self.events.emit(PlaybackEvent::Keystroke {
            block: keystroke.block,
            text: keystroke.text.clone(),
            cursor: keystroke.after,
        });
        Ok(true)
    }

    async fn move_cursor(&mut self, to: Position) -> Result<(), PlaybackError> {
        let mut host = self.host.lock().await;
        let found = host.get_cursor()?;
        if found != self.expected {
            return Err(PlaybackError::CursorMoved {
                expected: self.expected,
                found,
            });
        }
        host.set_cursor(to)?;
        self.expected = to;
        Ok(())
    }

    /// Wait `delay`, or less if cancelled. Returns false on cancellation.
    async fn pause(&self, delay: Duration) -> bool {
        if delay.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    fn finish(&mut self, terminal: PlaybackState) {
        if self.state.is_terminal() {
            return;
        }
        // Only legal moves into a terminal state reach here.
        let _ = self.state.advance(terminal);
    }
}
