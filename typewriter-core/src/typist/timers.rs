//! Fire-and-forget replay.
//!
//! Every keystroke gets its own tokio task that sleeps until an absolute
//! offset from run start (see [`PlaybackPlan::offsets`]). Timers do not wait
//! for earlier insertions to finish, so every handle is kept in
//! [`PendingTimers`] and aborted on cancellation; otherwise stale keystrokes
//! would keep landing in a buffer the user has since edited.
//!
//! A turn counter keeps insertions in plan order even when two timers are
//! woken in the same tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::PlaybackError;
use crate::host::{EditorHost, SharedHost};
use crate::position::Position;
use crate::PlaybackEvent;

use super::plan::{Keystroke, PlaybackPlan};
use super::{CancelToken, EventSink, Outcome, PlaybackReport};

/// Handles of every scheduled keystroke task.
#[derive(Debug, Default)]
pub struct PendingTimers {
    handles: Vec<JoinHandle<Result<(), PlaybackError>>>,
}

impl PendingTimers {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Timers that have not run to completion yet.
    pub fn outstanding(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn abort_all(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[derive(Debug, Default)]
struct Progress {
    inserted: AtomicUsize,
    blocks_completed: AtomicUsize,
}

/// A scheduled timer run.
#[derive(Debug)]
pub struct TimerPlayback {
    pending: PendingTimers,
    cancel: CancelToken,
    progress: Arc<Progress>,
    plan: PlaybackPlan,
}

impl TimerPlayback {
    /// Position the cursor at the plan's start and schedule every keystroke.
    pub async fn schedule<H: EditorHost + 'static>(
        host: SharedHost<H>,
        plan: PlaybackPlan,
        cancel: CancelToken,
        events: EventSink,
    ) -> Result<Self, PlaybackError> {
        host.lock().await.set_cursor(plan.start)?;

        let run_start = Instant::now();
        let offsets = plan.offsets();
        let progress = Arc::new(Progress::default());
        let (turn_tx, turn_rx) = watch::channel(0usize);
        let turn_tx = Arc::new(turn_tx);

        let mut handles = Vec::with_capacity(offsets.len());
        let mut seq = 0usize;
        for block in &plan.blocks {
            let last = block.keystrokes.len().saturating_sub(1);
            for (i, keystroke) in block.keystrokes.iter().enumerate() {
                let slot = Slot {
                    seq,
                    deadline: run_start + offsets[seq],
                    keystroke: keystroke.clone(),
                    opens_block: (i == 0).then_some(block.origin),
                    closes_block: (i == last).then_some(block.end),
                };
                let task = fire(
                    slot,
                    host.clone(),
                    cancel.clone(),
                    events.clone(),
                    turn_rx.clone(),
                    turn_tx.clone(),
                    progress.clone(),
                );
                handles.push(tokio::spawn(task));
                seq += 1;
            }
        }

        info!(
            timers = handles.len(),
            total_ms = plan.total_delay().as_millis() as u64,
            "timers scheduled"
        );

        Ok(Self {
            pending: PendingTimers { handles },
            cancel,
            progress,
            plan,
        })
    }

    pub fn pending(&self) -> &PendingTimers {
        &self.pending
    }

    pub fn inserted(&self) -> usize {
        self.progress.inserted.load(Ordering::SeqCst)
    }

    /// Stop the run: flag cancellation and abort every outstanding timer.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.pending.abort_all();
        debug!(outstanding = self.pending.outstanding(), "timers cancelled");
    }

    /// Wait for every timer to fire (or be aborted) and summarize the run.
    ///
    /// Cancellation observed while waiting aborts every outstanding timer.
    pub async fn join(self) -> PlaybackReport {
        let mut handles = self.pending.handles;
        let aborts: Vec<AbortHandle> = handles.iter().map(JoinHandle::abort_handle).collect();
        let mut aborted = false;
        let mut failure = None;

        for handle in handles.iter_mut() {
            let joined = loop {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled(), if !aborted => {
                        aborted = true;
                        aborts.iter().for_each(AbortHandle::abort);
                        debug!(timers = aborts.len(), "cancel observed, timers aborted");
                    }
                    joined = &mut *handle => break joined,
                }
            };
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failure.get_or_insert(e);
                }
                Err(join) if join.is_cancelled() => {}
                Err(join) => {
                    self.cancel.cancel();
                    failure.get_or_insert(PlaybackError::Timer(join.to_string()));
                }
            }
        }

        let inserted = self.progress.inserted.load(Ordering::SeqCst);
        let outcome = match failure {
            Some(e) => {
                warn!(error = %e, inserted, "timer run aborted");
                Outcome::Aborted(e)
            }
            None if inserted < self.plan.keystroke_count() => Outcome::Cancelled,
            None => Outcome::Done,
        };

        PlaybackReport {
            outcome,
            blocks_completed: self.progress.blocks_completed.load(Ordering::SeqCst),
            keystrokes: inserted,
            final_cursor: self.plan.cursor_after(inserted),
        }
    }
}

struct Slot {
    seq: usize,
    deadline: Instant,
    keystroke: Keystroke,
    opens_block: Option<Position>,
    closes_block: Option<Position>,
}

async fn fire<H: EditorHost>(
    slot: Slot,
    host: Arc<Mutex<H>>,
    cancel: CancelToken,
    events: EventSink,
    mut turn_rx: watch::Receiver<usize>,
    turn_tx: Arc<watch::Sender<usize>>,
    progress: Arc<Progress>,
) -> Result<(), PlaybackError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(()),
        _ = tokio::time::sleep_until(slot.deadline) => {}
    }

    // Earlier keystrokes first.
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(()),
        turn = async { turn_rx.wait_for(|turn| *turn >= slot.seq).await.map(|_| ()) } => {
            if turn.is_err() {
                return Ok(());
            }
        }
    }

    let result = insert(&slot, &host, &cancel, &events).await;
    match result {
        Ok(true) => {
            progress.inserted.fetch_add(1, Ordering::SeqCst);
            if slot.closes_block.is_some() {
                progress.blocks_completed.fetch_add(1, Ordering::SeqCst);
            }
            turn_tx.send_modify(|turn| *turn += 1);
            Ok(())
        }
        Ok(false) => Ok(()),
        Err(e) => {
            cancel.cancel();
            Err(e)
        }
    }
}

async fn insert<H: EditorHost>(
    slot: &Slot,
    host: &Mutex<H>,
    cancel: &CancelToken,
    events: &EventSink,
) -> Result<bool, PlaybackError> {
    let keystroke = &slot.keystroke;
    let mut host = host.lock().await;
    if cancel.is_cancelled() {
        return Ok(false);
    }

    let found = host.get_cursor()?;
    if found != keystroke.at {
        return Err(PlaybackError::CursorMoved {
            expected: keystroke.at,
            found,
        });
    }

    if let Some(origin) = slot.opens_block {
        events.emit(PlaybackEvent::BlockStarted {
            index: keystroke.block,
            origin,
        });
    }

    host.replace_range(&keystroke.text, keystroke.at)?;
    host.set_cursor(keystroke.after)?;
    if let Some(end) = slot.closes_block {
        host.set_cursor(end)?;
    }
    drop(host);

    events.emit(PlaybackEvent::Keystroke {
        block: keystroke.block,
        text: keystroke.text.clone(),
        cursor: keystroke.after,
    });
    if let Some(end) = slot.closes_block {
        events.emit(PlaybackEvent::BlockFinished {
            index: keystroke.block,
            cursor: end,
        });
    }
    Ok(true)
}
