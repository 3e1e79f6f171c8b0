//! Quill CLI entry point.
//!
//! Binary name: `quill`
//!
//! Parses CLI arguments, sets up tracing, wires the workflow engine, then
//! dispatches to the command handler.

mod cli;
mod reviewer;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use quill_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Before tracing so .env can carry RUST_LOG.
    let dotenv_path = quill_infra::config::load_dotenv();

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    if let Some(path) = dotenv_path {
        tracing::debug!("environment loaded from {}", path.display());
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "quill", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.config.clone()).await?;

    let result = match cli.command {
        Commands::Run {
            topic,
            thread_id,
            feedback,
        } => cli::run::run(&state, &topic, thread_id.as_deref(), feedback, cli.json).await,

        Commands::Shell => cli::shell::run_shell(&state, cli.json).await,

        Commands::Completions { .. } => Ok(()),
    };

    shutdown_tracing();
    result
}
