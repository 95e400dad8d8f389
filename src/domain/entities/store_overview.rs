use crate::domain::value_objects::Collection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionStatus {
    pub collection: Collection,
    pub record_count: usize,
    pub pending_count: usize,
}

/// Snapshot of the local store for the status surface: per-collection
/// counts, outstanding uploads and an approximate storage footprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreOverview {
    pub total_records: usize,
    pub pending_uploads: usize,
    pub collections: Vec<CollectionStatus>,
    pub total_size_bytes: u64,
    pub last_completed_at: Option<DateTime<Utc>>,
}
