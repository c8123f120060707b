mod app;
mod components;
mod config;
mod coordinator;
mod data;
mod events;
mod logging;
mod theme;
mod utils;

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::app::App;
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::data::client::ChainClient;
use crate::data::provider::AlloyChainClient;

// One thread: every state change happens on the app loop, and fetches
// interleave with it at await points.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::parse();
    let log_path = logging::init(config.log_file.clone(), &config.log_level)?;

    let registry = config.contract_registry()?;
    let queries = registry.dashboard_queries()?;
    registry.check_writable()?;

    // Connect to the Ethereum node
    eprintln!("Connecting to {}...", config.rpc_url);
    let client =
        AlloyChainClient::connect(&config.rpc_url, config.private_key.as_deref(), registry).await?;
    let chain_id = client.chain_id();
    eprintln!(
        "Connected to chain {} as {} (logging to {})",
        chain_id,
        client.sender(),
        log_path.display()
    );
    info!(chain_id, log = %log_path.display(), "starting dashboard");

    // Create event channel
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // Send initial connected event
    let _ = event_tx.send(events::AppEvent::Connected(chain_id));

    let client: Arc<dyn ChainClient> = Arc::new(client);
    let coordinator = Coordinator::new(client, queries, event_tx);
    let mut app = App::new(coordinator, event_rx, config.tick_rate_ms, config.explorer_url);

    // Initialize terminal
    let terminal = ratatui::init();
    let result = app.run(terminal).await;

    // Restore terminal
    ratatui::restore();

    result
}
