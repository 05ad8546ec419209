use std::thread;
use chrono::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use anyhow::Result;
use shared::builder::ServiceBuilder;
use shared::clock::{Clock, HostnameProvider};
use shared::types::Service;
use crate::config::RegistryConfig;
use crate::registry::{hash, store::ServiceStore};
use crate::source::SnapshotSource;

/// Commands sent to the registry thread
pub enum RegistryCommand {
    Upsert(Service, oneshot::Sender<bool>),
    GetAll(oneshot::Sender<Vec<Service>>),
    GetOne(String, oneshot::Sender<Option<Service>>),
    PortFor {
        id: String,
        service_port: u16,
        port_type: String,
        reply: oneshot::Sender<Option<Option<u16>>>,
    },
    Sweep {
        lifespan: Duration,
        reply: oneshot::Sender<Vec<String>>,
    },
    Shutdown,
}

/// Handle to interact with the registry
#[derive(Clone)]
pub struct RegistryHandle {
    tx: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Spawn the registry thread. `clock` decides staleness during sweeps.
    pub fn spawn(clock: impl Clock + 'static, hash_tx: watch::Sender<String>) -> Self {
        let (tx, mut rx) = mpsc::channel::<RegistryCommand>(256);

        let publish_hash = |store: &ServiceStore, hash_tx: &watch::Sender<String>| {
            let _ = hash_tx.send(hash::compute_hash(&store.get_all()));
        };

        thread::spawn(move || {
            let mut store = ServiceStore::new();

            while let Some(cmd) = rx.blocking_recv() {
                match cmd {
                    RegistryCommand::Upsert(service, reply) => {
                        let changed = store.upsert(service);
                        if changed {
                            publish_hash(&store, &hash_tx);
                        }
                        let _ = reply.send(changed);
                    }
                    RegistryCommand::GetAll(reply) => {
                        let _ = reply.send(store.get_all());
                    }
                    RegistryCommand::GetOne(id, reply) => {
                        let _ = reply.send(store.get(&id));
                    }
                    RegistryCommand::PortFor { id, service_port, port_type, reply } => {
                        let _ = reply.send(store.port_for(&id, service_port, &port_type));
                    }
                    RegistryCommand::Sweep { lifespan, reply } => {
                        let evicted = store.evict_stale(lifespan, &clock);
                        if !evicted.is_empty() {
                            publish_hash(&store, &hash_tx);
                        }
                        let _ = reply.send(evicted);
                    }
                    RegistryCommand::Shutdown => {
                        tracing::info!("Registry thread shutting down");
                        break;
                    }
                }
            }
        });

        Self { tx }
    }

    /// Store a fresh service snapshot. Returns true if data changed.
    pub async fn upsert(&self, service: Service) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RegistryCommand::Upsert(service, reply)).await?;
        Ok(rx.await?)
    }

    /// Get all services
    pub async fn get_all(&self) -> Result<Vec<Service>> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RegistryCommand::GetAll(reply)).await?;
        Ok(rx.await?)
    }

    /// Get a single service by id
    pub async fn get_one(&self, id: String) -> Result<Option<Service>> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RegistryCommand::GetOne(id, reply)).await?;
        Ok(rx.await?)
    }

    /// Resolve a logical port of a service. Outer `None` means the service is unknown.
    pub async fn port_for(
        &self,
        id: String,
        service_port: u16,
        port_type: String,
    ) -> Result<Option<Option<u16>>> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RegistryCommand::PortFor {
            id,
            service_port,
            port_type,
            reply,
        }).await?;
        Ok(rx.await?)
    }

    /// Evict records not refreshed within `lifespan`. Returns evicted ids.
    pub async fn sweep(&self, lifespan: Duration) -> Result<Vec<String>> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RegistryCommand::Sweep { lifespan, reply }).await?;
        Ok(rx.await?)
    }

    /// Shutdown the registry thread
    pub async fn shutdown(&self) -> Result<()> {
        self.tx.send(RegistryCommand::Shutdown).await?;
        Ok(())
    }
}

/// Rebuild every container in the snapshot and store the results.
/// Returns the number of records refreshed.
pub async fn refresh<C: Clock, H: HostnameProvider>(
    registry: &RegistryHandle,
    source: &SnapshotSource,
    builder: &ServiceBuilder<C, H>,
) -> Result<usize> {
    let containers = source.list_containers().await?;
    let count = containers.len();

    for container in &containers {
        let service = builder.build(container);
        let id = service.id.clone();
        if registry.upsert(service).await? {
            tracing::debug!("Registered service {}", id);
        }
    }

    Ok(count)
}

/// Registry event loop - refreshes records from the snapshot and evicts stale ones
pub async fn run<C: Clock, H: HostnameProvider>(
    registry: RegistryHandle,
    source: SnapshotSource,
    builder: ServiceBuilder<C, H>,
    refresh_interval_secs: u64,
    config: RegistryConfig,
    cancel: CancellationToken,
) -> Result<()> {
    let lifespan = config.lifespan()?;
    let mut refresh_interval = tokio::time::interval(
        std::time::Duration::from_secs(refresh_interval_secs)
    );
    let mut sweep_interval = tokio::time::interval(
        std::time::Duration::from_secs(config.sweep_interval_secs)
    );

    loop {
        tokio::select! {
            _ = refresh_interval.tick() => {
                match refresh(&registry, &source, &builder).await {
                    Ok(count) => tracing::debug!("Refreshed {} services", count),
                    Err(e) => tracing::error!("Failed to refresh services: {:#}", e),
                }
            }
            _ = sweep_interval.tick() => {
                match registry.sweep(lifespan).await {
                    Ok(evicted) => {
                        for id in evicted {
                            tracing::info!("Evicted stale service {}", id);
                        }
                    }
                    Err(e) => tracing::error!("Failed to sweep registry: {}", e),
                }
            }
            _ = cancel.cancelled() => {
                tracing::info!("Registry manager shutting down");
                break;
            }
        }
    }

    Ok(())
}
