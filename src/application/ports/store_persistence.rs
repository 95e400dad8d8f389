use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable mapping of string keys to serialized collection snapshots.
/// The engine never assumes a specific persistence technology; adapters
/// live in `infrastructure::storage`.
#[async_trait]
pub trait StorePersistence: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Must be durable before returning: a crash between calls loses at
    /// most the in-flight operation.
    async fn write(&self, key: &str, value: &str) -> Result<(), AppError>;

    async fn remove(&self, key: &str) -> Result<(), AppError>;
}
