//! Storefront chat CLI and REST API entry point.
//!
//! Binary name: `shopchat`
//!
//! Parses CLI arguments, loads configuration, wires the HTTP adapters, then
//! dispatches to a command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,shopchat=debug",
        _ => "trace",
    };
    shopchat_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "shopchat", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    let result = run(cli, &state).await;
    shopchat_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli, state: &AppState) -> anyhow::Result<()> {
    tracing::debug!(data_dir = %state.data_dir.display(), "Configuration loaded");

    match cli.command {
        Commands::Chat { args, history } => {
            cli::chat::loop_runner::run_chat(state, &args, history, cli.json).await?;
        }

        Commands::Send { message, args } => {
            cli::send::send_once(state, &message, &args, cli.json).await?;
        }

        Commands::History { limit } => {
            cli::history::list_history(state, limit, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Chat API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(%addr, bot_id = state.ai_client.bot_id(), "REST API started");

            let router = http::router::build_router(state.clone());

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            state.flush_all().await;
            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
