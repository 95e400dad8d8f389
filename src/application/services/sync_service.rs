use crate::application::ports::{Clock, RemoteRecord, SyncGateway};
use crate::application::services::EntityStore;
use crate::domain::entities::{SyncSession, SyncableRecord};
use crate::domain::value_objects::Collection;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Orchestrates one reconciliation run against the remote authority:
/// upload every pending record, then pull new remote records, reporting
/// progress and accumulated errors through the session snapshot.
pub struct SyncService {
    store: Arc<EntityStore>,
    gateway: Arc<dyn SyncGateway>,
    clock: Arc<dyn Clock>,
    session: Arc<RwLock<SyncSession>>,
}

impl SyncService {
    pub async fn new(
        store: Arc<EntityStore>,
        gateway: Arc<dyn SyncGateway>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let last_completed_at = store.last_completed_at().await?;
        Ok(Self {
            store,
            gateway,
            clock,
            session: Arc::new(RwLock::new(SyncSession::idle(last_completed_at))),
        })
    }

    pub async fn session(&self) -> SyncSession {
        self.session.read().await.clone()
    }

    /// Runs one upload-then-download reconciliation. At most one run is
    /// in progress at any time; a call that arrives while a run is
    /// active returns the current session unchanged (silent no-op).
    /// The returned session is always completed; failures accumulate in
    /// `errors` instead of propagating.
    pub async fn run_sync(&self) -> SyncSession {
        if !self.try_begin().await {
            debug!("sync run already in progress; trigger ignored");
            return self.session().await;
        }
        info!("sync run started");

        let pending = match self.snapshot_pending().await {
            Ok(pending) => pending,
            Err(e) => {
                self.record_error(format!("failed to read pending records: {e}"))
                    .await;
                return self.finish().await;
            }
        };

        let upload_count = pending.len();
        let mut total = upload_count + self.gateway.expected_downloads();
        let mut processed = 0usize;
        if total == 0 {
            // nothing known to do: the session completes at 100%
            // immediately, though the download pass below still runs
            self.update_progress(0, 0).await;
        }

        for (collection, record) in &pending {
            match self.gateway.upload(*collection, record).await {
                Ok(()) => {
                    let now = self.clock.now();
                    if let Err(e) = self.store.mark_synced(*collection, &record.id, now).await {
                        self.record_error(format!(
                            "failed to persist acknowledgment for {collection}/{}: {e}",
                            record.id
                        ))
                        .await;
                    }
                }
                Err(e) => {
                    warn!(collection = %collection, id = %record.id, "upload failed: {e}");
                    if let Err(store_err) = self.store.mark_error(*collection, &record.id).await {
                        self.record_error(format!(
                            "failed to record upload failure for {collection}/{}: {store_err}",
                            record.id
                        ))
                        .await;
                    }
                    self.record_error(format!(
                        "upload failed for {collection}/{}: {e}",
                        record.id
                    ))
                    .await;
                }
            }
            // a failed item still consumes its progress slot
            processed += 1;
            self.update_progress(processed, total).await;
        }

        match self.gateway.download().await {
            Ok(remote) => {
                // reconcile the estimate with the actual batch size
                total = upload_count + remote.len();
                for remote_record in remote {
                    if let Err(e) = self.apply_remote(remote_record).await {
                        self.record_error(format!("failed to store downloaded record: {e}"))
                            .await;
                    }
                    processed += 1;
                    self.update_progress(processed, total).await;
                }
            }
            Err(e) => {
                // the run ends here at whatever progress was reached;
                // records already acknowledged keep their status
                warn!("download failed: {e}");
                self.record_error(format!("download failed: {e}")).await;
            }
        }

        self.finish().await
    }

    /// Download-only prefetch for upcoming offline work. Shares the
    /// session machinery and the one-run-at-a-time gate, but never
    /// advances the last-successful-sync marker: nothing was uploaded.
    pub async fn download_for_offline(&self) -> SyncSession {
        if !self.try_begin().await {
            debug!("sync run already in progress; prefetch ignored");
            return self.session().await;
        }
        info!("offline prefetch started");

        match self.gateway.download().await {
            Ok(remote) => {
                let total = remote.len();
                if total == 0 {
                    self.update_progress(0, 0).await;
                }
                let mut processed = 0usize;
                for remote_record in remote {
                    if let Err(e) = self.apply_remote(remote_record).await {
                        self.record_error(format!("failed to store downloaded record: {e}"))
                            .await;
                    }
                    processed += 1;
                    self.update_progress(processed, total).await;
                }
            }
            Err(e) => {
                warn!("download failed: {e}");
                self.record_error(format!("download failed: {e}")).await;
            }
        }

        let mut session = self.session.write().await;
        session.finish(None);
        info!(
            progress = session.progress_percent,
            errors = session.errors.len(),
            "offline prefetch finished"
        );
        session.clone()
    }

    async fn try_begin(&self) -> bool {
        let mut session = self.session.write().await;
        if session.in_progress {
            return false;
        }
        session.begin();
        true
    }

    /// Snapshot of the retry set, in collection order then insertion
    /// order; the upload loop walks this deterministically.
    async fn snapshot_pending(&self) -> Result<Vec<(Collection, SyncableRecord)>, AppError> {
        let mut pending = Vec::new();
        for collection in Collection::ALL {
            for record in self.store.get_pending(collection).await? {
                pending.push((collection, record));
            }
        }
        Ok(pending)
    }

    /// Last-writer-wins merge, guarded: a local record that still awaits
    /// upload is not overwritten by the remote copy; the local edit
    /// wins until its own upload.
    async fn apply_remote(&self, remote: RemoteRecord) -> Result<(), AppError> {
        let RemoteRecord {
            collection,
            id,
            payload,
        } = remote;
        if let Some(local) = self.store.get(collection, &id).await? {
            if local.sync_status.needs_sync() {
                debug!(collection = %collection, id = %id, "local unsynced edit wins over download");
                return Ok(());
            }
        }
        let record = SyncableRecord::new(id.clone(), payload);
        self.store.upsert(collection, record).await?;
        self.store
            .mark_synced(collection, &id, self.clock.now())
            .await
    }

    async fn update_progress(&self, processed: usize, total: usize) {
        let mut session = self.session.write().await;
        session.record_progress(processed, total);
    }

    async fn record_error(&self, message: String) {
        let mut session = self.session.write().await;
        session.record_error(message);
    }

    /// Closes the run. The marker advances only when the run was
    /// error-free and only once the store accepted it.
    async fn finish(&self) -> SyncSession {
        let error_free = self.session.read().await.errors.is_empty();
        let mut completed_at = None;
        if error_free {
            let now = self.clock.now();
            match self.store.set_last_completed_at(now).await {
                Ok(()) => completed_at = Some(now),
                Err(e) => {
                    self.record_error(format!("failed to persist sync marker: {e}"))
                        .await;
                }
            }
        }
        let mut session = self.session.write().await;
        session.finish(completed_at);
        info!(
            progress = session.progress_percent,
            errors = session.errors.len(),
            "sync run finished"
        );
        session.clone()
    }
}
