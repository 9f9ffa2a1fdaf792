use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::blocks;
use crate::config::{ConfigError, Strategy, TypewriterConfig};
use crate::error::EngineError;
use crate::host::{EditorHost, SharedHost};
use crate::typist::{
    CancelToken, EventSink, Outcome, PlaybackPlan, PlaybackReport, TimerPlayback, Typist,
};
use crate::{PlaybackEvent, RunId};

/// Command id the host registers "Start Typewriter" under.
pub const START_TYPEWRITER_ID: &str = "start-typewriter";
pub const START_TYPEWRITER_NAME: &str = "Start Typewriter";

/// The main entry point for the typewriter.
/// The host holds one instance of this per buffer.
#[derive(Debug)]
pub struct TypewriterEngine {
    config: TypewriterConfig,
    // Set while a run is in flight; one run at a time.
    active: Arc<AtomicBool>,
}

impl TypewriterEngine {
    pub fn new(config: TypewriterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            active: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &TypewriterConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// "Start Typewriter": capture the buffer, clear it, and replay it.
    ///
    /// Returns as soon as the run is spawned. Playback continues on the
    /// tokio runtime; progress arrives on the returned event receiver and
    /// the final report through [`RunHandle::finished`].
    pub async fn start_typewriter<H: EditorHost + 'static>(
        &self,
        host: SharedHost<H>,
    ) -> Result<(RunHandle, mpsc::UnboundedReceiver<PlaybackEvent>), EngineError> {
        let guard = ActiveGuard::acquire(&self.active).ok_or(EngineError::AlreadyRunning)?;

        // 1. Snapshot + clear, then read where insertion starts
        let (snapshot, start) = {
            let mut h = host.lock().await;
            let snapshot = blocks::capture(&mut *h)?;
            let start = h.get_cursor()?;
            (snapshot, start)
        };

        // 2. Build the keystroke plan
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let plan = PlaybackPlan::build(&snapshot, start, &self.config, &mut rng)?;

        let id = Uuid::new_v4();
        info!(
            run = %id,
            blocks = plan.blocks.len(),
            keystrokes = plan.keystroke_count(),
            strategy = ?self.config.strategy,
            "typewriter run started"
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let events = EventSink::new(tx);
        events.emit(PlaybackEvent::RunStarted {
            run: id,
            blocks: plan.blocks.len(),
            keystrokes: plan.keystroke_count(),
        });

        // 3. Spawn the run; the guard clears `active` however it ends
        let cancel = CancelToken::new();
        let task = match self.config.strategy {
            Strategy::Sequential => {
                let typist = Typist::new(host, cancel.clone(), events.clone());
                tokio::spawn(async move {
                    let _guard = guard;
                    let report = typist.play(&plan).await;
                    finish(id, &events, report)
                })
            }
            Strategy::Timers => {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    let _guard = guard;
                    let report = match TimerPlayback::schedule(host, plan, cancel, events.clone())
                        .await
                    {
                        Ok(timers) => timers.join().await,
                        Err(e) => PlaybackReport {
                            outcome: Outcome::Aborted(e),
                            blocks_completed: 0,
                            keystrokes: 0,
                            final_cursor: start,
                        },
                    };
                    finish(id, &events, report)
                })
            }
        };

        Ok((RunHandle { id, cancel, task }, rx))
    }
}

fn finish(id: RunId, events: &EventSink, report: PlaybackReport) -> PlaybackReport {
    info!(
        run = %id,
        outcome = ?report.outcome,
        keystrokes = report.keystrokes,
        cursor = %report.final_cursor,
        "typewriter run finished"
    );
    events.emit(PlaybackEvent::Finished(report.clone()));
    report
}

/// Handle to a spawned run.
#[derive(Debug)]
pub struct RunHandle {
    id: RunId,
    cancel: CancelToken,
    task: JoinHandle<PlaybackReport>,
}

impl RunHandle {
    pub fn id(&self) -> RunId {
        self.id
    }

    /// Stop scheduling further keystrokes. Already-inserted text stays.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Completion signal.
    pub async fn finished(self) -> Result<PlaybackReport, EngineError> {
        self.task
            .await
            .map_err(|e| EngineError::Join(e.to_string()))
    }
}

struct ActiveGuard(Arc<AtomicBool>);

impl ActiveGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
