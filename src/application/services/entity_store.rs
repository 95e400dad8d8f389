use crate::application::ports::StorePersistence;
use crate::domain::entities::{CollectionStatus, StoreOverview, SyncableRecord};
use crate::domain::value_objects::{Collection, RecordId, SyncStatus};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const SYNC_META_KEY: &str = "sync_meta";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SyncMetadata {
    last_completed_at: Option<DateTime<Utc>>,
    auto_sync: Option<bool>,
}

/// Owner of every domain record. Each mutating call is one atomic
/// read-modify-write of a collection snapshot, persisted through the
/// port before the call returns.
pub struct EntityStore {
    persistence: Arc<dyn StorePersistence>,
    default_auto_sync: bool,
    // serializes read-modify-write cycles against concurrent writers
    guard: Mutex<()>,
}

impl EntityStore {
    pub fn new(persistence: Arc<dyn StorePersistence>, default_auto_sync: bool) -> Self {
        Self {
            persistence,
            default_auto_sync,
            guard: Mutex::new(()),
        }
    }

    pub async fn get_all(&self, collection: Collection) -> Result<Vec<SyncableRecord>, AppError> {
        let _guard = self.guard.lock().await;
        self.load_collection(collection).await
    }

    /// Records awaiting upload: `Pending` and `Error` alike. A record
    /// whose upload failed stays in the retry set until acknowledged.
    pub async fn get_pending(
        &self,
        collection: Collection,
    ) -> Result<Vec<SyncableRecord>, AppError> {
        let _guard = self.guard.lock().await;
        let records = self.load_collection(collection).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.sync_status.needs_sync())
            .collect())
    }

    pub async fn get(
        &self,
        collection: Collection,
        id: &RecordId,
    ) -> Result<Option<SyncableRecord>, AppError> {
        let _guard = self.guard.lock().await;
        let records = self.load_collection(collection).await?;
        Ok(records.into_iter().find(|r| &r.id == id))
    }

    /// Sole write path for user edits and downloaded records. Inserts at
    /// the end of the collection, replaces in place when the id exists,
    /// and always resets the record to `Pending`; acknowledgments go
    /// through `mark_synced`.
    pub async fn upsert(
        &self,
        collection: Collection,
        mut record: SyncableRecord,
    ) -> Result<(), AppError> {
        let _guard = self.guard.lock().await;
        let mut records = self.load_collection(collection).await?;
        record.sync_status = SyncStatus::Pending;
        match records.iter().position(|r| r.id == record.id) {
            Some(index) => {
                record.last_sync_time = record.last_sync_time.or(records[index].last_sync_time);
                records[index] = record;
            }
            None => records.push(record),
        }
        self.save_collection(collection, &records).await
    }

    /// Idempotent; a record deleted since the snapshot was taken is a
    /// no-op, not an error.
    pub async fn mark_synced(
        &self,
        collection: Collection,
        id: &RecordId,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let _guard = self.guard.lock().await;
        let mut records = self.load_collection(collection).await?;
        match records.iter().position(|r| &r.id == id) {
            Some(index) => {
                records[index].mark_synced(at);
                self.save_collection(collection, &records).await
            }
            None => {
                debug!(collection = %collection, id = %id, "mark_synced on absent record");
                Ok(())
            }
        }
    }

    pub async fn mark_error(&self, collection: Collection, id: &RecordId) -> Result<(), AppError> {
        let _guard = self.guard.lock().await;
        let mut records = self.load_collection(collection).await?;
        match records.iter().position(|r| &r.id == id) {
            Some(index) => {
                records[index].mark_error();
                self.save_collection(collection, &records).await
            }
            None => {
                debug!(collection = %collection, id = %id, "mark_error on absent record");
                Ok(())
            }
        }
    }

    pub async fn pending_count(&self) -> Result<usize, AppError> {
        let _guard = self.guard.lock().await;
        let mut count = 0;
        for collection in Collection::ALL {
            count += self
                .load_collection(collection)
                .await?
                .iter()
                .filter(|r| r.sync_status.needs_sync())
                .count();
        }
        Ok(count)
    }

    /// Approximate serialized size across all collections; capacity
    /// reporting only.
    pub async fn total_size_estimate(&self) -> Result<u64, AppError> {
        let _guard = self.guard.lock().await;
        let mut bytes = 0u64;
        for collection in Collection::ALL {
            if let Some(raw) = self.persistence.read(collection.as_str()).await? {
                bytes += raw.len() as u64;
            }
        }
        Ok(bytes)
    }

    pub async fn overview(&self) -> Result<StoreOverview, AppError> {
        let _guard = self.guard.lock().await;
        let mut collections = Vec::with_capacity(Collection::ALL.len());
        let mut total_records = 0;
        let mut pending_uploads = 0;
        let mut total_size_bytes = 0u64;
        for collection in Collection::ALL {
            let raw = self.persistence.read(collection.as_str()).await?;
            total_size_bytes += raw.as_ref().map(|v| v.len() as u64).unwrap_or(0);
            let records = Self::parse_collection(raw)?;
            let pending = records
                .iter()
                .filter(|r| r.sync_status.needs_sync())
                .count();
            total_records += records.len();
            pending_uploads += pending;
            collections.push(CollectionStatus {
                collection,
                record_count: records.len(),
                pending_count: pending,
            });
        }
        let meta = self.load_meta().await?;
        Ok(StoreOverview {
            total_records,
            pending_uploads,
            collections,
            total_size_bytes,
            last_completed_at: meta.last_completed_at,
        })
    }

    /// Wipes the three collections and the "last successful sync"
    /// marker; the auto-sync toggle survives a reset.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        let _guard = self.guard.lock().await;
        for collection in Collection::ALL {
            self.persistence.remove(collection.as_str()).await?;
        }
        let mut meta = self.load_meta().await?;
        meta.last_completed_at = None;
        self.save_meta(&meta).await
    }

    pub async fn last_completed_at(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let _guard = self.guard.lock().await;
        Ok(self.load_meta().await?.last_completed_at)
    }

    pub async fn set_last_completed_at(&self, at: DateTime<Utc>) -> Result<(), AppError> {
        let _guard = self.guard.lock().await;
        let mut meta = self.load_meta().await?;
        meta.last_completed_at = Some(at);
        self.save_meta(&meta).await
    }

    pub async fn auto_sync_enabled(&self) -> Result<bool, AppError> {
        let _guard = self.guard.lock().await;
        let meta = self.load_meta().await?;
        Ok(meta.auto_sync.unwrap_or(self.default_auto_sync))
    }

    pub async fn set_auto_sync(&self, enabled: bool) -> Result<(), AppError> {
        let _guard = self.guard.lock().await;
        let mut meta = self.load_meta().await?;
        meta.auto_sync = Some(enabled);
        self.save_meta(&meta).await
    }

    async fn load_collection(
        &self,
        collection: Collection,
    ) -> Result<Vec<SyncableRecord>, AppError> {
        let raw = self.persistence.read(collection.as_str()).await?;
        Self::parse_collection(raw)
    }

    fn parse_collection(raw: Option<String>) -> Result<Vec<SyncableRecord>, AppError> {
        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save_collection(
        &self,
        collection: Collection,
        records: &[SyncableRecord],
    ) -> Result<(), AppError> {
        let raw = serde_json::to_string(records)?;
        self.persistence.write(collection.as_str(), &raw).await
    }

    async fn load_meta(&self) -> Result<SyncMetadata, AppError> {
        match self.persistence.read(SYNC_META_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(SyncMetadata::default()),
        }
    }

    async fn save_meta(&self, meta: &SyncMetadata) -> Result<(), AppError> {
        let raw = serde_json::to_string(meta)?;
        self.persistence.write(SYNC_META_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::RecordPayload;
    use crate::infrastructure::storage::MemoryPersistence;
    use serde_json::json;

    fn store() -> EntityStore {
        EntityStore::new(Arc::new(MemoryPersistence::new()), true)
    }

    fn record(id: &str, title: &str) -> SyncableRecord {
        SyncableRecord::new(
            RecordId::new(id.to_string()).unwrap(),
            RecordPayload::new(json!({"title": title})).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_upsert_forces_pending_and_keeps_position() {
        let store = store();
        store
            .upsert(Collection::WorkOrders, record("wo-1", "first"))
            .await
            .unwrap();
        store
            .upsert(Collection::WorkOrders, record("wo-2", "second"))
            .await
            .unwrap();

        let id = RecordId::new("wo-1".to_string()).unwrap();
        store
            .mark_synced(Collection::WorkOrders, &id, Utc::now())
            .await
            .unwrap();

        // replacing an existing record keeps insertion order and resets
        // it to pending
        store
            .upsert(Collection::WorkOrders, record("wo-1", "edited"))
            .await
            .unwrap();
        let all = store.get_all(Collection::WorkOrders).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id.as_str(), "wo-1");
        assert_eq!(all[0].sync_status, SyncStatus::Pending);
        assert!(all[0].last_sync_time.is_some());
    }

    #[tokio::test]
    async fn test_mark_synced_is_idempotent_and_absent_is_noop() {
        let store = store();
        store
            .upsert(Collection::Inspections, record("ins-1", "tower 14"))
            .await
            .unwrap();
        let id = RecordId::new("ins-1".to_string()).unwrap();
        let at = Utc::now();
        store
            .mark_synced(Collection::Inspections, &id, at)
            .await
            .unwrap();
        store
            .mark_synced(Collection::Inspections, &id, at)
            .await
            .unwrap();

        let missing = RecordId::new("ins-404".to_string()).unwrap();
        store
            .mark_synced(Collection::Inspections, &missing, at)
            .await
            .unwrap();

        let all = store.get_all(Collection::Inspections).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].sync_status, SyncStatus::Synced);
        assert_eq!(all[0].last_sync_time, Some(at));
    }

    #[tokio::test]
    async fn test_pending_set_includes_error_records() {
        let store = store();
        store
            .upsert(Collection::WorkOrders, record("wo-1", "a"))
            .await
            .unwrap();
        store
            .upsert(Collection::WorkOrders, record("wo-2", "b"))
            .await
            .unwrap();
        let id = RecordId::new("wo-1".to_string()).unwrap();
        store.mark_error(Collection::WorkOrders, &id).await.unwrap();

        let pending = store.get_pending(Collection::WorkOrders).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(store.pending_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_clear_all_wipes_marker_but_keeps_toggle() {
        let store = store();
        store
            .upsert(Collection::Attachments, record("att-1", "photo"))
            .await
            .unwrap();
        store.set_last_completed_at(Utc::now()).await.unwrap();
        store.set_auto_sync(false).await.unwrap();

        store.clear_all().await.unwrap();

        assert!(store
            .get_all(Collection::Attachments)
            .await
            .unwrap()
            .is_empty());
        assert!(store.last_completed_at().await.unwrap().is_none());
        assert!(!store.auto_sync_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn test_total_size_estimate_grows_with_records() {
        let store = store();
        let empty = store.total_size_estimate().await.unwrap();
        store
            .upsert(Collection::WorkOrders, record("wo-1", "substation fence"))
            .await
            .unwrap();
        let with_record = store.total_size_estimate().await.unwrap();
        assert!(with_record > empty);

        let overview = store.overview().await.unwrap();
        assert_eq!(overview.total_records, 1);
        assert_eq!(overview.pending_uploads, 1);
        assert_eq!(overview.collections.len(), 3);
    }
}
