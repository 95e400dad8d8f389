pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryPersistence;
pub use sqlite_store::SqlitePersistence;
