use crate::domain::entities::SyncableRecord;
use crate::domain::value_objects::{Collection, RecordId, RecordPayload};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A record held by the remote authority, as returned by `download`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteRecord {
    pub collection: Collection,
    pub id: RecordId,
    pub payload: RecordPayload,
}

/// The remote authority. `Ok(())` from `upload` is the acknowledgment
/// that the remote now holds an identical copy; timeout handling is the
/// gateway's responsibility and surfaces as an `Err`.
#[async_trait]
pub trait SyncGateway: Send + Sync {
    async fn upload(
        &self,
        collection: Collection,
        record: &SyncableRecord,
    ) -> Result<(), AppError>;

    async fn download(&self) -> Result<Vec<RemoteRecord>, AppError>;

    /// Best-effort estimate of how many records `download` will return,
    /// used only for progress reporting. Zero when unknown.
    fn expected_downloads(&self) -> usize {
        0
    }
}
