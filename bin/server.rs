// Reduzo Procurement Desk - Web Server
// REST API over the shared workspace

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use reduzo::api::{router, AppState};
use reduzo::logging::{init_logging, LogTarget};
use reduzo::{AppConfig, Workspace};

#[derive(Parser)]
#[command(name = "reduzo-server", version, about = "Procurement desk REST API")]
struct Cli {
    /// Configuration file (defaults to $REDUZO_CONFIG, then ./reduzo.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging, LogTarget::Terminal).context("Failed to initialise logging")?;

    let mut workspace = match &config.seed.path {
        Some(path) => Workspace::from_seed_file(path)
            .with_context(|| format!("Failed to load seed data from {}", path.display()))?,
        None => Workspace::demo(Utc::now()),
    };
    workspace.quotations.refresh_statuses(Utc::now());

    // Create shared state
    let state = AppState::new(
        workspace,
        &config.dashboard.public_base_url,
        config.default_deadline(),
    );

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(%addr, "server listening");
    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/quotations", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
