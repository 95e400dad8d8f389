pub mod clock;
pub mod store_persistence;
pub mod sync_gateway;

pub use clock::Clock;
pub use store_persistence::StorePersistence;
pub use sync_gateway::{RemoteRecord, SyncGateway};
