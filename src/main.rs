use anyhow::{Context, Result};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{info, warn};

use brandpulse::constants::{AGENT_NAME, GEMINI_MODEL};
use brandpulse::gateway::ModelGateway;
use brandpulse::server::{start_server, AppState};
use brandpulse::session::SessionStore;

/// BrandPulse chat backend: relays chat and product-analysis requests to
/// Gemini and keeps an in-memory conversation log.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to bind the API server to.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port for the API server.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Maximum number of concurrent model calls.
    #[arg(long, env = "BRANDPULSE_MAX_INFLIGHT", default_value_t = 8)]
    max_inflight: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present (for GOOGLE_API_KEY and friends).
    dotenvy::dotenv().ok();

    // Log level comes from RUST_LOG (e.g. RUST_LOG=info,brandpulse=debug).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    info!("Starting BrandPulse Chat API");
    info!("Agent: {}", AGENT_NAME);
    info!("Model: {}", GEMINI_MODEL.as_str());

    let base_dir = std::env::current_dir().context("Failed to resolve working directory")?;
    let gateway = ModelGateway::initialize(&base_dir, cli.max_inflight);
    match &gateway {
        ModelGateway::Ready { auth, .. } => {
            info!("BrandPulse Assistant initialized (auth: {})", auth.as_str());
        }
        ModelGateway::Unavailable { reason } => {
            // The server still comes up and serves the non-model endpoints.
            warn!("BrandPulse Assistant unavailable: {}", reason);
        }
    }

    let state = AppState {
        gateway: Arc::new(gateway),
        sessions: SessionStore::new(),
    };

    let addr = SocketAddr::new(cli.host, cli.port);
    start_server(addr, state).await
}
