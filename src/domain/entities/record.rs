use crate::domain::value_objects::{RecordId, RecordPayload, SyncStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncableRecord {
    pub id: RecordId,
    pub payload: RecordPayload,
    pub sync_status: SyncStatus,
    /// Set only on transition to `Synced`; an edit that makes the record
    /// pending again keeps the timestamp of its last acknowledgment.
    pub last_sync_time: Option<DateTime<Utc>>,
}

impl SyncableRecord {
    pub fn new(id: RecordId, payload: RecordPayload) -> Self {
        Self {
            id,
            payload,
            sync_status: SyncStatus::Pending,
            last_sync_time: None,
        }
    }

    /// A record drafted while offline, with a client-generated id.
    pub fn with_generated_id(payload: RecordPayload) -> Self {
        Self::new(RecordId::generate(), payload)
    }

    pub fn mark_synced(&mut self, at: DateTime<Utc>) {
        self.sync_status = SyncStatus::Synced;
        self.last_sync_time = Some(at);
    }

    pub fn mark_error(&mut self) {
        self.sync_status = SyncStatus::Error;
    }
}
