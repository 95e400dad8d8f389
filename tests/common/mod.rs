#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fieldsync::{
    AppError, Clock, Collection, RecordId, RecordPayload, RemoteRecord, SyncGateway,
    SyncableRecord,
};
use serde_json::json;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scriptable remote authority: per-id upload failures, queued download
/// batches and call counters for asserting trigger behavior.
pub struct MockGateway {
    pub upload_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    upload_order: Mutex<Vec<String>>,
    fail_uploads: Mutex<HashSet<String>>,
    download_batches: Mutex<VecDeque<Vec<RemoteRecord>>>,
    download_error: Mutex<Option<String>>,
    expected_downloads: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            upload_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            upload_order: Mutex::new(Vec::new()),
            fail_uploads: Mutex::new(HashSet::new()),
            download_batches: Mutex::new(VecDeque::new()),
            download_error: Mutex::new(None),
            expected_downloads: AtomicUsize::new(0),
        }
    }

    pub fn fail_upload(&self, id: &str) {
        self.fail_uploads.lock().unwrap().insert(id.to_string());
    }

    pub fn clear_upload_failures(&self) {
        self.fail_uploads.lock().unwrap().clear();
    }

    pub fn queue_download(&self, batch: Vec<RemoteRecord>) {
        self.download_batches.lock().unwrap().push_back(batch);
    }

    pub fn fail_next_download(&self, message: &str) {
        *self.download_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_expected_downloads(&self, count: usize) {
        self.expected_downloads.store(count, Ordering::SeqCst);
    }

    pub fn uploads(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn upload_order(&self) -> Vec<String> {
        self.upload_order.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncGateway for MockGateway {
    async fn upload(
        &self,
        collection: Collection,
        record: &SyncableRecord,
    ) -> Result<(), AppError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.upload_order
            .lock()
            .unwrap()
            .push(format!("{}/{}", collection, record.id));
        if self.fail_uploads.lock().unwrap().contains(record.id.as_str()) {
            return Err(AppError::Gateway("remote rejected the record".to_string()));
        }
        Ok(())
    }

    async fn download(&self) -> Result<Vec<RemoteRecord>, AppError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.download_error.lock().unwrap().take() {
            return Err(AppError::Gateway(message));
        }
        Ok(self
            .download_batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    fn expected_downloads(&self) -> usize {
        self.expected_downloads.load(Ordering::SeqCst)
    }
}

/// Deterministic wall clock, advanced explicitly by tests.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn record(id: &str, title: &str) -> SyncableRecord {
    SyncableRecord::new(
        RecordId::new(id.to_string()).unwrap(),
        RecordPayload::new(json!({"title": title})).unwrap(),
    )
}

pub fn remote(collection: Collection, id: &str, title: &str) -> RemoteRecord {
    RemoteRecord {
        collection,
        id: RecordId::new(id.to_string()).unwrap(),
        payload: RecordPayload::new(json!({"title": title})).unwrap(),
    }
}

pub fn id(value: &str) -> RecordId {
    RecordId::new(value.to_string()).unwrap()
}
