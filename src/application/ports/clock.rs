use chrono::{DateTime, Utc};

/// Wall-clock source for sync timestamps, injectable so tests produce
/// deterministic `last_sync_time`/`last_completed_at` values.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
