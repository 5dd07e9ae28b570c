//! `chatbridge serve` -- webhook server lifecycle.

use std::time::Duration;

use anyhow::Result;
use console::style;

use crate::http::router::build_router;
use crate::state::AppState;

/// How long in-flight events may run after the listener stops.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn serve(state: AppState, quiet: bool) -> Result<()> {
    let server = &state.config.server;
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    if !quiet {
        print_banner(&state, &addr);
    }
    tracing::info!(%addr, api_path = %server.api_path, "listening");

    let router = build_router(state.clone());
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let stats = match tokio::time::timeout(DRAIN_TIMEOUT, state.dispatcher.drain()).await {
        Ok(stats) => stats,
        Err(_) => {
            tracing::warn!(
                pending = state.dispatcher.pending(),
                "drain timed out, cancelling in-flight events"
            );
            state.dispatcher.shutdown().await
        }
    };
    state.dispatcher.cancel();
    tracing::info!(
        completed = stats.completed,
        panicked = stats.panicked,
        cancelled = stats.cancelled,
        "event pipeline stopped"
    );

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

fn print_banner(state: &AppState, addr: &str) {
    let config = &state.config;
    println!();
    println!(
        "  {} chatbridge v{} listening on {}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION"),
        style(format!("http://{addr}")).cyan()
    );
    println!("  Event path: {}", style(&config.server.api_path).bold());
    if let Some(site_url) = &config.server.site_url {
        println!(
            "  Public URL: {}",
            style(format!(
                "{}{}",
                site_url.trim_end_matches('/'),
                config.server.api_path
            ))
            .cyan()
        );
    }
    println!(
        "  Backend:    {}",
        style(&config.backend.proxy_api_server).bold()
    );
    if let Some(model) = &config.backend.model {
        println!("  Model:      {model}");
    }
    match &config.server.bot_id {
        Some(bot_id) => println!("  Bot id:     {bot_id}"),
        None => println!(
            "  {}",
            style("Bot id not set: group chats answer only the command prefix").yellow()
        ),
    }
    if config.server.reply_url.is_none() {
        println!("  {}", style("Reply URL not set: replies are only logged").yellow());
    }
    println!("  {}", style("Press Ctrl+C to stop").dim());
    println!();
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
