//! Offline-first synchronization engine for field operations tracking.
//!
//! Records created or edited in the field persist locally with a
//! per-record sync status; when connectivity returns, the engine
//! reconciles the local store against the remote authority, uploading
//! pending records and pulling new ones while reporting progress to the
//! host application.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

mod state;

pub use application::ports::{Clock, RemoteRecord, StorePersistence, SyncGateway};
pub use application::services::{EntityStore, SyncScheduler, SyncService};
pub use domain::entities::{CollectionStatus, StoreOverview, SyncSession, SyncableRecord};
pub use domain::value_objects::{Collection, RecordId, RecordPayload, SyncStatus};
pub use infrastructure::connectivity::ConnectivityMonitor;
pub use infrastructure::storage::{MemoryPersistence, SqlitePersistence};
pub use infrastructure::SystemClock;
pub use shared::config::{AppConfig, DatabaseConfig, StorageConfig, SyncConfig};
pub use shared::error::{AppError, Result};
pub use state::AppState;

pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldsync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
