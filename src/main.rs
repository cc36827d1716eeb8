mod api;
mod chat;
mod session;
mod surface;
mod terminal;

use std::sync::Arc;

use tracing::{info, Level};

use api::ApiClient;
use session::Orchestrator;
use terminal::TerminalSurface;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    // Load env
    let _ = dotenv::dotenv();

    let client = Arc::new(ApiClient::from_env()?);
    info!(base_url = client.base_url(), "Backend client initialized");

    let surface = Arc::new(TerminalSurface::new());
    let mut orchestrator = Orchestrator::new(client, surface.clone());

    terminal::run(&mut orchestrator, surface).await
}
