//! Pawtection web server
//!
//! Loads the trained pipeline once and serves the quote form.

use anyhow::{Context, Result};
use clap::Parser;
use pawtection_model::{PawtectionConfig, Predictor};
use pawtection_web::{build_router, serve_until, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pawtection-web")]
#[command(about = "Pawtection dog insurance quote form")]
#[command(version)]
struct Cli {
    /// Bind address
    #[arg(long, env = "PAWTECTION_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(short, long, env = "PAWTECTION_PORT", default_value = "8501")]
    port: u16,

    /// Trained model artifact
    #[arg(short, long, env = "PAWTECTION_MODEL", default_value = "dog_bite_score_predictor.bin")]
    model: PathBuf,

    /// Optional TOML configuration file with a [quote] table
    #[arg(short, long, env = "PAWTECTION_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PawtectionConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PawtectionConfig::default(),
    };

    let predictor = Predictor::load(&cli.model, config.quote)
        .with_context(|| format!("Failed to load model {}", cli.model.display()))?;
    let metadata = &predictor.pipeline().metadata;
    tracing::info!(
        "Loaded model {} ({} trees, {} training rows)",
        cli.model.display(),
        metadata.n_trees,
        metadata.n_samples
    );

    let app = build_router(AppState::new(Arc::new(predictor)));

    let addr = format!("{}:{}", cli.host, cli.port);
    tracing::info!("🚀 Pawtection starting on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    serve_until(listener, app, shutdown_signal())
        .await
        .context("Web server terminated unexpectedly")?;

    tracing::info!("Pawtection shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
