pub mod config;
pub mod error;

pub use config::{AppConfig, DatabaseConfig, StorageConfig, SyncConfig};
pub use error::{AppError, Result};
