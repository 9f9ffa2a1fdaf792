use std::any::Any;
use std::io::Write;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    // RUST_LOG=typewriter_core=debug,typewriter_bridge=trace
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout belongs to the rendered buffer; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .compact()
        .try_init();
}

/// Text of a panic payload, for `panic!("literal")` and formatted panics.
pub fn payload_text(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "<opaque panic payload>"
    }
}

/// Leave the alternate screen and show the cursor again.
pub fn restore_terminal<W: Write>(out: &mut W) {
    let _ = crossterm::execute!(
        out,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    );
}

/// A panic mid-replay would otherwise leave the shell on the alternate
/// screen with a hidden cursor. Restores the terminal, logs, then defers
/// to the previous hook.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal(&mut std::io::stdout());

        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_default();
        tracing::error!(
            thread = std::thread::current().name().unwrap_or("unnamed"),
            %location,
            payload = payload_text(info.payload()),
            "typewriter panicked"
        );

        previous(info);
    }));
}
