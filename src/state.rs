use crate::application::ports::{Clock, StorePersistence, SyncGateway};
use crate::application::services::{EntityStore, SyncScheduler, SyncService};
use crate::domain::entities::{StoreOverview, SyncSession, SyncableRecord};
use crate::domain::value_objects::Collection;
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::infrastructure::storage::SqlitePersistence;
use crate::infrastructure::SystemClock;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;

/// Wires the engine together and carries the surface presentation
/// components talk to: pull reads (`get_all`, `session`, `overview`),
/// push writes (`upsert`, `run_sync`, `clear_all`) and the platform
/// reachability feed (`set_online`).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<EntityStore>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub sync: Arc<SyncService>,
    pub scheduler: Arc<SyncScheduler>,
}

impl AppState {
    pub async fn new(config: AppConfig, gateway: Arc<dyn SyncGateway>) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.storage.data_dir)
            .map_err(|e| AppError::Storage(format!("failed to create data directory: {e}")))?;
        let persistence = Arc::new(
            SqlitePersistence::connect(&config.database.url, config.database.max_connections)
                .await?,
        );
        Self::with_persistence(config, persistence, gateway, Arc::new(SystemClock)).await
    }

    /// Assembly seam for tests and alternative stores: any persistence
    /// adapter and clock can stand in for SQLite and wall time.
    pub async fn with_persistence(
        config: AppConfig,
        persistence: Arc<dyn StorePersistence>,
        gateway: Arc<dyn SyncGateway>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let store = Arc::new(EntityStore::new(persistence, config.sync.auto_sync));
        let connectivity = Arc::new(ConnectivityMonitor::new(true));
        let sync = Arc::new(SyncService::new(store.clone(), gateway, clock).await?);
        let scheduler = Arc::new(SyncScheduler::new(
            sync.clone(),
            store.clone(),
            connectivity.clone(),
            Duration::from_secs(config.sync.sync_interval),
        ));
        scheduler.start().await;

        Ok(Self {
            config,
            store,
            connectivity,
            sync,
            scheduler,
        })
    }

    pub async fn get_all(&self, collection: Collection) -> Result<Vec<SyncableRecord>, AppError> {
        self.store.get_all(collection).await
    }

    pub async fn get_pending(
        &self,
        collection: Collection,
    ) -> Result<Vec<SyncableRecord>, AppError> {
        self.store.get_pending(collection).await
    }

    pub async fn upsert(
        &self,
        collection: Collection,
        record: SyncableRecord,
    ) -> Result<(), AppError> {
        self.store.upsert(collection, record).await
    }

    pub async fn overview(&self) -> Result<StoreOverview, AppError> {
        self.store.overview().await
    }

    pub async fn session(&self) -> SyncSession {
        self.sync.session().await
    }

    /// Manual trigger: runs regardless of the auto-sync toggle, still
    /// subject to the one-run-at-a-time gate.
    pub async fn run_sync(&self) -> SyncSession {
        self.sync.run_sync().await
    }

    pub async fn download_for_offline(&self) -> SyncSession {
        self.sync.download_for_offline().await
    }

    /// "Reset offline data": wipes all three collections and the sync
    /// marker.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        self.store.clear_all().await
    }

    pub async fn auto_sync_enabled(&self) -> Result<bool, AppError> {
        self.store.auto_sync_enabled().await
    }

    /// Takes effect at the next scheduling decision; an in-flight run is
    /// never interrupted.
    pub async fn set_auto_sync(&self, enabled: bool) -> Result<(), AppError> {
        self.store.set_auto_sync(enabled).await
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Entry point for the platform's reachability callback.
    pub fn set_online(&self, online: bool) {
        self.connectivity.set_online(online);
    }

    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }
}
