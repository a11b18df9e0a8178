//! jlcli - run code in a long-running Julia worker.
//!
//! Parses the command line, sends one request to the worker socket and
//! exits with the status derived from its reply.

use std::io;
use std::process::ExitCode;

use jlcli::cli::Cli;
use jlcli::stdio::ProcFdProbe;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Runs on the current thread only: one connection, one request.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the worker's captured output.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "jlcli=warn".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let cli = Cli::try_parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit());
    tracing::debug!(?cli, "Parsed arguments");
    let config = cli.into_config(&ProcFdProbe::current());

    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let result = jlcli::run(config, &mut stdout, &mut stderr).await;

    match result {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            tracing::debug!(error = ?e, "Invocation failed");
            if e.exit_code() == jlcli::error::EXIT_CONFIGURATION {
                eprintln!("{}", e);
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}
