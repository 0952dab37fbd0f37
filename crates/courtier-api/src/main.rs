//! Courtier API - Main Entry Point

use std::path::PathBuf;

use clap::Parser;
use courtier_api::{build_router, ApiConfig, ApiState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "courtier-api", version, about = "Courtier lead capture and provider webhook API")]
struct Args {
    /// Configuration file (JSON)
    #[arg(short, long, env = "CONFIG_PATH", default_value = "/etc/courtier/api.json")]
    config: PathBuf,

    /// Listen address, overrides the configuration
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!("Courtier API v{}", env!("CARGO_PKG_VERSION"));

    let mut config = if args.config.exists() {
        ApiConfig::load(&args.config)?
    } else {
        tracing::warn!(path = %args.config.display(), "Config not found, using defaults");
        ApiConfig::default()
    };
    config.apply_env();
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }

    let state = ApiState::from_config(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
