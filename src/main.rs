use std::sync::Arc;

use xcall_tracker::chain::ChainRegistry;
use xcall_tracker::chains;
use xcall_tracker::config::Config;
use xcall_tracker::indexer::XCallScanClient;
use xcall_tracker::persist::JsonStore;
use xcall_tracker::tracker::{
    TrackerOptions, XCallTracker, XMESSAGE_STORE_NAME, XMESSAGE_STORE_VERSION,
};
use xcall_tracker::{api, metrics};

fn main() -> eyre::Result<()> {
    // Install color-eyre for better error reporting
    color_eyre::install()?;

    // Run the async main
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    // Initialize logging
    init_logging();

    tracing::info!("Starting xCall Tracker");

    // Load configuration
    let config = Config::load()?;
    tracing::info!(config = ?config, "Configuration loaded");

    // Build chain clients
    let mut registry = ChainRegistry::new();
    for chain in &config.chains {
        let client = chains::build_client(
            chain.kind,
            chain.id.clone(),
            chain.rpc_url.clone(),
            chain.xcall_address.clone(),
        )?;
        registry.register(client);
        tracing::info!(chain = %chain.id, kind = %chain.kind, "Chain client registered");
    }

    let options = TrackerOptions {
        scan_interval: config.scan_interval,
        refresh_interval: config.refresh_interval,
        stall_timeout_advances: config.stall_timeout_advances,
        persistence: config
            .store_path
            .as_ref()
            .map(|path| JsonStore::new(path, XMESSAGE_STORE_NAME, XMESSAGE_STORE_VERSION)),
        indexer: config
            .xcallscan_base_url
            .as_ref()
            .map(XCallScanClient::new)
            .transpose()?,
    };
    let tracker = Arc::new(XCallTracker::new(registry, options));

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    // Setup signal handlers
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(()).await;
    });

    // Start metrics/API server
    let api_addr: std::net::SocketAddr = config.api_bind.parse()?;
    let api_tracker = tracker.clone();
    tokio::spawn(async move {
        if let Err(e) = api::start_api_server(api_addr, api_tracker).await {
            tracing::error!(error = %e, "API server error");
        }
    });

    // Run the tracker loops until shutdown
    if let Err(e) = tracker.run(shutdown_rx).await {
        tracing::error!(error = %e, "Tracker error");
    }

    metrics::UP.set(0.0);
    tracing::info!("xCall Tracker stopped");
    Ok(())
}

/// Initialize tracing/logging with structured output
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,xcall_tracker=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(filter)
        .init();
}

/// Wait for shutdown signals (SIGINT/SIGTERM)
async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
