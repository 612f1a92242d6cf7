// surfcast - terminal client for agent-driven UI surfaces
//
// An agent describes UI as data: a stream of typed operations that build and
// mutate component graphs ("surfaces") on the client. This tool talks to such
// an agent endpoint and renders the result in a terminal.
//
// Architecture:
// - Client (reqwest): posts chat turns / user actions, streams frame lines back
// - Protocol: frame decoding and the typed surface operations
// - Surface store: per-session component graphs, mutated only by operations
// - Renderer: catalog-dispatched pass from component graph to display tree
// - Action channel: form interception, debounce, open_maps handling
// - TUI (ratatui): transcript + live surface pane + composer
// - Storage: writes turn events to JSON Lines files for later analysis
// - Event system: mpsc channels connect all components

mod action;
mod catalog;
mod cli;
mod client;
mod config;
mod demo;
mod events;
mod logging;
mod protocol;
mod render;
mod storage;
mod surface;
mod theme;
mod tui;
mod util;

use anyhow::Result;
use chrono::Utc;
use config::Config;
use logging::{LogBuffer, TuiLogLayer};
use std::sync::{Arc, Mutex};
use storage::Storage;
use surface::SessionStores;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Per-session surface stores shared between the transport task (applies
/// operations) and the TUI (renders). std::sync::Mutex because the render
/// loop reads synchronously; applies and render passes are both short.
pub type SharedStores = Arc<Mutex<SessionStores>>;

/// Generate a unique session ID, used as the store shard key, the `userId`
/// sent to the agent, and the log file name
/// Format: YYYYMMDD-HHMMSS-XXXX (timestamp + 4 random hex chars)
fn generate_session_id() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let timestamp = Utc::now().format("%Y%m%d-%H%M%S");
    // Use RandomState to get a random value without adding a dependency
    let random = RandomState::new().build_hasher().finish();
    let short_hash = format!("{:04x}", random & 0xFFFF);

    format!("{}-{}", timestamp, short_hash)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI subcommands first (config --show, --reset, --path)
    // If a subcommand was handled, exit early
    let Some(cli_args) = cli::handle_cli() else {
        return Ok(());
    };

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    if let Some(endpoint) = cli_args.endpoint {
        config.endpoint = endpoint;
    }
    if cli_args.demo {
        config.demo_mode = true;
    }

    // Capture logs to an in-memory buffer the TUI renders; writing to stdout
    // would garble the alternate screen
    // Precedence: RUST_LOG env var > config file > default "info"
    let log_buffer = LogBuffer::new();
    let default_filter = format!("surfcast={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(TuiLogLayer::new(log_buffer.clone()))
        .init();

    // Generate session ID for this run
    let session_id = generate_session_id();
    tracing::debug!("Session ID: {}", session_id);

    // Shared surface stores: transport applies, TUI renders
    let stores: SharedStores = Arc::new(Mutex::new(SessionStores::new()));

    // Event channels
    // TUI channel: transport -> TUI display updates
    // Command channel: TUI -> transport (chat turns, user actions)
    let (event_tx, event_rx) = mpsc::channel(1000);
    let (command_tx, command_rx) = mpsc::channel(64);

    // Spawn the storage task (if enabled)
    // This runs in the background, writing events to disk
    let storage_tx = if config.features.storage {
        let (storage_tx, storage_rx) = mpsc::channel(1000);
        match Storage::new(config.log_dir.clone(), session_id.clone(), storage_rx) {
            Ok(storage) => {
                tokio::spawn(async move {
                    if let Err(error) = storage.run().await {
                        tracing::error!(?error, "storage task failed");
                    }
                });
                Some(storage_tx)
            }
            Err(error) => {
                tracing::warn!(?error, "storage disabled: could not create log directory");
                None
            }
        }
    } else {
        None
    };

    // Spawn the transport task: the live client, or the scripted demo agent
    let transport_handle = if config.demo_mode {
        tracing::info!("Running in DEMO MODE - scripted agent responses");
        let demo_session = session_id.clone();
        let demo_stores = stores.clone();
        let demo_event_tx = event_tx.clone();
        let demo_storage_tx = storage_tx.clone();
        tokio::spawn(async move {
            if let Err(error) = demo::run_demo(
                demo_session,
                demo_stores,
                demo_event_tx,
                demo_storage_tx,
                command_rx,
            )
            .await
            {
                tracing::error!(?error, "demo task failed");
            }
        })
    } else {
        let client = client::AgentClient::new(
            config.endpoint.clone(),
            session_id.clone(),
            stores.clone(),
            event_tx.clone(),
            storage_tx.clone(),
        );
        tokio::spawn(async move {
            if let Err(error) = client.run(command_rx).await {
                tracing::error!(?error, "client task failed");
            }
        })
    };

    // Drop our copies so channels close once the tasks finish
    drop(event_tx);
    drop(storage_tx);

    // Run the TUI on this task; returns when the user quits
    tui::run_tui(config, session_id, stores, command_tx, event_rx, log_buffer).await?;

    // The TUI dropped its command sender; a mid-stream transport task may
    // still be reading, so stop it rather than wait out the turn
    transport_handle.abort();

    Ok(())
}
