mod api;
mod config;
mod registry;
mod registry_manager;
mod source;

use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use shared::builder::ServiceBuilder;
use shared::clock::{HostnameProvider, SystemClock, SystemHostname};
use crate::config::Config;
use crate::registry_manager::RegistryHandle;
use crate::source::SnapshotSource;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("registrar_agentd=info,shared=info"))
        )
        .init();

    tracing::info!("Starting registrar-agentd");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/service-registrar/agentd.toml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    tracing::info!("Loaded config from {}", config_path);

    // Resolve the hostname once; every record built by this agent carries it
    let hostname = config
        .agent
        .hostname
        .clone()
        .unwrap_or_else(|| SystemHostname.hostname());
    tracing::info!("Registering services for host {:?}", hostname);

    let builder = ServiceBuilder::new(config.agent.default_ip.clone())
        .with_hostname(hostname.clone());

    let source = SnapshotSource::new(&config.agent.snapshot_path);
    tracing::info!("Reading containers from {}", source.path().display());

    // Start registry thread
    let (hash_tx, hash_rx) = watch::channel(registry::hash::compute_hash(&[]));
    let registry = RegistryHandle::spawn(SystemClock, hash_tx);

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    // Spawn registry manager task
    let mgr_cancel = cancel.clone();
    let mgr_registry = registry.clone();
    let mgr_config = config.registry.clone();
    let refresh_interval_secs = config.agent.refresh_interval_secs;
    let mgr_handle = tokio::spawn(async move {
        if let Err(e) = registry_manager::run(
            mgr_registry,
            source,
            builder,
            refresh_interval_secs,
            mgr_config,
            mgr_cancel,
        ).await {
            tracing::error!("Registry manager error: {}", e);
        }
    });

    // Build API router
    let app_state = api::routes::AppState {
        registry: registry.clone(),
        hash_rx,
        agent: Arc::new(api::routes::AgentInfo {
            hostname,
            default_ip: config.agent.default_ip.clone(),
            lifespan_secs: config.registry.lifespan_secs,
        }),
    };
    let app = api::routes::router(app_state);

    // Bind HTTP server
    let listener = tokio::net::TcpListener::bind(&config.api.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", config.api.listen))?;

    tracing::info!("API listening on {}", config.api.listen);

    // Run server with graceful shutdown
    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");

    cancel.cancel();

    let _ = tokio::join!(mgr_handle, server_handle);

    if let Err(e) = registry.shutdown().await {
        tracing::error!("Failed to shutdown registry: {}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
