use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use watchcord_catalog::{spawn_refresh_task, CatalogCache, ResourceProber};
use watchcord_gateway::{EventStream, GatewayClient};

use crate::config::BridgeConfig;
use crate::enrich::ActivityEnricher;
use crate::error::BridgeError;
use crate::host::{EntityDescriptor, HostBus, StateRefresh};
use crate::registry::Registry;
use crate::sync::Synchronizer;

/// A running bridge: the periodic catalog refresh task plus the
/// synchronizer loop, with a handle for teardown.
pub struct Bridge {
    registry: Arc<Registry>,
    refresh_task: JoinHandle<()>,
    sync_task: JoinHandle<Result<(), BridgeError>>,
    shutdown: Arc<Notify>,
}

impl Bridge {
    /// Bring the bridge up: eager catalog load, registry build (the
    /// outbound resolution calls happen here, before any entity exists),
    /// then the background refresh task and the event loop. Returns the
    /// handle plus the host-side refresh stream.
    pub async fn start(
        config: BridgeConfig,
        client: Arc<GatewayClient>,
        events: EventStream,
    ) -> Result<(Self, mpsc::UnboundedReceiver<StateRefresh>), BridgeError> {
        let catalog = Arc::new(CatalogCache::new(config.catalog_config())?);
        catalog.refresh().await;

        let registry = Arc::new(Registry::build(&config, &client).await);

        let (host, refreshes) = HostBus::channel();
        let shutdown = Arc::new(Notify::new());
        let refresh_task = spawn_refresh_task(
            catalog.clone(),
            Duration::from_secs(config.catalog_refresh_secs),
            shutdown.clone(),
        );
        let enricher = ActivityEnricher::new(catalog, ResourceProber::new()?, &config);
        let synchronizer = Synchronizer::new(registry.clone(), client, enricher, host, &config);
        let sync_task = tokio::spawn(synchronizer.run(events));

        Ok((
            Self {
                registry,
                refresh_task,
                sync_task,
                shutdown,
            },
            refreshes,
        ))
    }

    /// Registration payload for the host's `registerEntities` call.
    pub fn descriptors(&self) -> &[EntityDescriptor] {
        self.registry.descriptors()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Wait for the event loop to finish: `Ok` once the stream closes,
    /// `Err` when the client surfaced a fatal error. Stops the refresh
    /// task either way.
    pub async fn join(self) -> Result<(), BridgeError> {
        let Self {
            refresh_task,
            sync_task,
            shutdown,
            ..
        } = self;
        let result = match sync_task.await {
            Ok(result) => result,
            Err(error) => Err(BridgeError::Connection(error.to_string())),
        };
        shutdown.notify_one();
        let _ = refresh_task.await;
        result
    }

    /// Best-effort teardown: stop the refresh task and abort the event
    /// loop. In-flight enrichment probes complete or fail silently.
    pub async fn shutdown(self) {
        let Self {
            refresh_task,
            sync_task,
            shutdown,
            ..
        } = self;
        shutdown.notify_one();
        sync_task.abort();
        let _ = sync_task.await;
        let _ = refresh_task.await;
        tracing::info!("bridge shut down");
    }
}
