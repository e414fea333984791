//! Aula CLI and REST API entry point.
//!
//! Binary name: `aula`
//!
//! Parses CLI arguments, initializes the store and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use std::time::Duration;

use aula_core::chat::sweeper::spawn_sweeper;
use aula_observe::{LogFormat, init_tracing, shutdown_tracing};
use aula_types::topic::NewTopic;
use clap::Parser;
use clap_complete::generate;
use tokio_util::sync::CancellationToken;

use cli::{Cli, Commands, TopicAction, UserAction};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,aula=debug",
        _ => "trace",
    };
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_tracing(format, filter, cli.otel).map_err(|e| anyhow::anyhow!(e))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "aula", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            serve(state, &host, port).await?;
        }

        Commands::Chat {
            user,
            topic,
            message,
        } => {
            cli::chat::send_message(&state, &user, &topic, &message, cli.json).await?;
        }

        Commands::History { user, limit } => {
            cli::chat::history(&state, user.as_deref(), limit, cli.json).await?;
        }

        Commands::Stats => {
            cli::stats::stats(&state, cli.json).await?;
        }

        Commands::Topic { action } => match action {
            TopicAction::Add {
                name,
                subject,
                instructions,
                content,
            } => {
                let new = NewTopic {
                    name,
                    subject,
                    instructions,
                    content,
                };
                cli::topic::add_topic(&state, new, cli.json).await?;
            }
            TopicAction::List => {
                cli::topic::list_topics(&state, cli.json).await?;
            }
            TopicAction::Show { name } => {
                cli::topic::show_topic(&state, &name, cli.json).await?;
            }
        },

        Commands::User { action } => match action {
            UserAction::Register { user_id, classroom } => {
                cli::user::register_user(&state, &user_id, classroom.as_deref(), cli.json)
                    .await?;
            }
            UserAction::Show { user_id } => {
                cli::user::show_user(&state, &user_id, cli.json).await?;
            }
        },

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Run the REST API with the background expiry sweep until shutdown.
async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let cancel = CancellationToken::new();
    let sweeper = spawn_sweeper(
        state.memory().clone(),
        Duration::from_secs(state.config.memory.sweep_interval_secs),
        cancel.clone(),
    );

    println!(
        "  {} Aula API listening on {}",
        console::style("▲").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());
    tracing::info!(
        %addr,
        capacity = state.config.memory.capacity,
        window_size = state.config.memory.window_size,
        "Server started"
    );

    let router = http::router::build_router(state);
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cancel.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Conversation sweeper task failed");
    }
    served?;

    println!("\n  Server stopped.");
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
