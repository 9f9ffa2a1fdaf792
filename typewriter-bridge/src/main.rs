use clap::Parser;
use std::process::ExitCode;

use typewriter_bridge::app;
use typewriter_bridge::cli::CliArgs;
use typewriter_bridge::util::{init_tracing, install_panic_hook};
use typewriter_core::Outcome;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();

    init_tracing();
    install_panic_hook();

    let report = app::run(args, std::io::stdout()).await?;
    Ok(match report.outcome {
        Outcome::Done | Outcome::Cancelled => ExitCode::SUCCESS,
        Outcome::Aborted(_) => ExitCode::FAILURE,
    })
}
