//! Ledger RPC daemon - Main Entry Point
//!
//! Wires configuration, logging, the ledger adapter, the command table and
//! admission control into one JSON-RPC HTTP server.

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use ledger_rpc_api::{
    register_all, FunctionManager, NodeInfo, RequestPipeline, ResourceManager, RpcServer,
};
use ledger_rpc_core::port::SystemTimeProvider;
use ledger_rpc_infra_memory::{InMemoryLedgerState, LedgerFixture};

use crate::config::{config_path, NodeConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging first so configuration problems are reported
    let _log_guard = telemetry::init_logging()?;

    info!("ledger-rpcd v{} starting...", VERSION);

    // 2. Configuration
    let path = config_path();
    let config = NodeConfig::load(&path)?;
    info!(config = %path.display(), port = config.rpc.port, "Configuration loaded");

    // 3. Ledger state
    let fixture = match &config.ledger.fixture {
        Some(fixture) => LedgerFixture::from_path(fixture)
            .with_context(|| format!("cannot load ledger fixture {}", fixture.display()))?,
        None => LedgerFixture::genesis(),
    };
    let ledgers = Arc::new(InMemoryLedgerState::from_fixture(fixture));

    // 4. Command table; a duplicate name stops startup
    let mut builder = FunctionManager::builder();
    register_all(&mut builder).context("command registration failed")?;
    let functions = Arc::new(builder.build());
    info!(commands = functions.len(), "Commands registered");

    // 5. Admission control and pipeline
    let resources = Arc::new(ResourceManager::new(
        config.resource.resource_config(),
        Arc::new(SystemTimeProvider),
    ));
    let pipeline = Arc::new(
        RequestPipeline::new(
            functions,
            resources.clone(),
            Arc::new(config.rpc.admin_policy()),
            ledgers,
        )
        .with_node(NodeInfo {
            version: VERSION.to_string(),
            ..NodeInfo::default()
        })
        .with_max_request_size(config.rpc.max_request_size),
    );

    // 6. Server
    let mut server = RpcServer::new(config.rpc.server_config(), pipeline)
        .start()
        .await
        .context("RPC server start failed")?;
    info!(addr = %server.local_addr(), "JSON-RPC server listening");

    // 7. Idle consumer sweep
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep_every = Duration::from_secs(config.resource.sweep_interval_secs.max(1));
    let sweeper = tokio::spawn(sweep_consumers(resources, sweep_every, shutdown_rx));

    info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown
    let _ = shutdown_tx.send(true);
    server.stop();
    match tokio::time::timeout(SHUTDOWN_GRACE, server.stopped()).await {
        Ok(result) => result.context("RPC server failed")?,
        Err(_) => warn!("RPC server did not stop within {:?}", SHUTDOWN_GRACE),
    }
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, sweeper).await;

    info!("Shutdown complete.");
    Ok(())
}

/// Drop consumers whose usage has fully decayed, until shutdown.
async fn sweep_consumers(
    resources: Arc<ResourceManager>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = resources.sweep();
                if removed > 0 {
                    debug!(removed, remaining = resources.len(), "Swept idle consumers");
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}
