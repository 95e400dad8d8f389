use crate::application::services::{EntityStore, SyncService};
use crate::infrastructure::connectivity::ConnectivityMonitor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Decides *when* a sync run happens, never *how*: one run per
/// offline→online edge, plus a periodic check while online with
/// outstanding work. Both triggers defer to the engine's
/// one-run-at-a-time gate, so a reconnect edge and an interval tick in
/// the same instant still produce a single run.
pub struct SyncScheduler {
    sync: Arc<SyncService>,
    store: Arc<EntityStore>,
    connectivity: Arc<ConnectivityMonitor>,
    interval: Duration,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncScheduler {
    pub fn new(
        sync: Arc<SyncService>,
        store: Arc<EntityStore>,
        connectivity: Arc<ConnectivityMonitor>,
        interval: Duration,
    ) -> Self {
        Self {
            sync,
            store,
            connectivity,
            interval,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub async fn start(&self) {
        let mut tasks = self.tasks.lock().await;
        if !tasks.is_empty() {
            debug!("scheduler already started");
            return;
        }
        tasks.push(self.spawn_reconnect_task());
        tasks.push(self.spawn_periodic_task());
        info!(interval_secs = self.interval.as_secs(), "sync scheduler started");
    }

    /// A toggle flip or shutdown never interrupts a run already in
    /// progress; aborting here only stops future triggers.
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
        }
        info!("sync scheduler stopped");
    }

    fn spawn_reconnect_task(&self) -> JoinHandle<()> {
        let sync = self.sync.clone();
        let store = self.store.clone();
        let mut rx = self.connectivity.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                if !online {
                    continue;
                }
                match store.auto_sync_enabled().await {
                    Ok(true) => {
                        info!("connectivity restored, starting sync run");
                        sync.run_sync().await;
                    }
                    Ok(false) => debug!("connectivity restored, auto-sync disabled"),
                    Err(e) => warn!("failed to read auto-sync setting: {e}"),
                }
            }
        })
    }

    fn spawn_periodic_task(&self) -> JoinHandle<()> {
        let sync = self.sync.clone();
        let store = self.store.clone();
        let connectivity = self.connectivity.clone();
        let period = self.interval;
        tokio::spawn(async move {
            // first check one full period after startup
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !connectivity.is_online() {
                    continue;
                }
                match store.auto_sync_enabled().await {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        warn!("failed to read auto-sync setting: {e}");
                        continue;
                    }
                }
                if sync.session().await.in_progress {
                    continue;
                }
                match store.pending_count().await {
                    Ok(0) => {}
                    Ok(count) => {
                        debug!(pending = count, "periodic check found pending records");
                        sync.run_sync().await;
                    }
                    Err(e) => warn!("failed to count pending records: {e}"),
                }
            }
        })
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        if let Ok(tasks) = self.tasks.try_lock() {
            for task in tasks.iter() {
                task.abort();
            }
        }
    }
}
