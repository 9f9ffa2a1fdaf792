//! Runs one file through the engine and renders the replay.

use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info};
use typewriter_core::{
    MemoryEditor, PlaybackEvent, PlaybackReport, TypewriterEngine, START_TYPEWRITER_ID,
    START_TYPEWRITER_NAME,
};

use crate::cli::CliArgs;
use crate::render::{Mode, Renderer};
use crate::settings;

/// Load `args.input` into an in-memory buffer and type it back out to `out`.
///
/// Ctrl-C cancels the run; the text typed so far stays.
pub async fn run<W: Write>(args: CliArgs, out: W) -> Result<PlaybackReport> {
    let config = settings::resolve(&args)?;
    let text = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let host = MemoryEditor::with_text(&text).shared();
    let engine = TypewriterEngine::new(config)?;

    let (run, mut events) = engine.start_typewriter(host.clone()).await?;
    info!(
        command = START_TYPEWRITER_ID,
        run = %run.id(),
        input = %args.input.display(),
        strategy = ?engine.config().strategy,
        "{START_TYPEWRITER_NAME}"
    );

    let cancel = run.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, cancelling run");
            cancel.cancel();
        }
    });

    let mode = if args.plain { Mode::Plain } else { Mode::Live };
    let mut renderer = Renderer::new(out, mode);
    renderer.begin()?;

    while let Some(event) = events.recv().await {
        match event {
            PlaybackEvent::Keystroke { text, .. } => {
                renderer.keystroke(&text)?;
                if renderer.mode() == Mode::Live {
                    let editor = host.lock().await;
                    renderer.frame(&editor.text(), editor.cursor())?;
                }
            }
            PlaybackEvent::Finished(_) => break,
            other => debug!(?other, "playback event"),
        }
    }

    let report = run.finished().await?;
    interrupt.abort();

    let final_text = host.lock().await.text();
    renderer.end(&final_text)?;

    info!(
        outcome = ?report.outcome,
        keystrokes = report.keystrokes,
        cursor = %report.final_cursor,
        "replay complete"
    );
    Ok(report)
}
