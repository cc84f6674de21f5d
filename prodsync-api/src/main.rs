//! prodsync-api - Product Resolution Microservice
//!
//! Resolves free-form issue summaries to canonical product names and
//! reconciles them against a Jira single-select field, creating missing
//! options and writing the resolved value back onto the issue.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use prodsync_api::{build_router, AppState};
use prodsync_common::ServiceConfig;

/// Command-line overrides (highest priority, above ENV and TOML)
#[derive(Debug, Parser)]
#[command(name = "prodsync-api", version)]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Starting prodsync-api (Product Resolution) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = ServiceConfig::resolve(args.config.as_deref())?;
    let port = args.port.unwrap_or(config.port);

    info!("Jira project: {}", config.jira_project_key);
    info!("Product field: {}", config.product_field_id);

    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on http://0.0.0.0:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
