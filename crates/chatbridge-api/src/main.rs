//! chatbridge CLI and webhook server entry point.
//!
//! Binary name: `chatbridge`
//!
//! Parses CLI arguments, loads configuration, wires the backend and event
//! pipeline, then runs the requested command.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use chatbridge_infra::config::load_bridge_config;
use chatbridge_observe::tracing_setup::{default_directive, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(default_directive(cli.quiet, cli.verbose), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "chatbridge", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = load_bridge_config(cli.config.as_deref()).await;
    cli.overrides.apply(&mut config);
    if let Commands::Serve(args) = &cli.command {
        args.apply(&mut config.server);
    }

    let state = AppState::build(config)?;

    let result = match cli.command {
        Commands::Serve(_) => cli::serve::serve(state, cli.quiet).await,
        Commands::Ask { question, chat_id } => {
            cli::ask::ask(&state, &question.join(" "), &chat_id, cli.json).await
        }
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}
