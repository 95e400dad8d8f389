use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reporting state of one sync run. A session is created when a run
/// starts and replaced when the next run starts; `last_completed_at`
/// and residual `errors` are the only parts that outlive a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSession {
    pub in_progress: bool,
    pub progress_percent: u8,
    pub errors: Vec<String>,
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl SyncSession {
    pub fn idle(last_completed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            in_progress: false,
            progress_percent: 0,
            errors: Vec::new(),
            last_completed_at,
        }
    }

    pub fn begin(&mut self) {
        self.in_progress = true;
        self.progress_percent = 0;
        self.errors.clear();
    }

    /// Progress is monotone within a run: a recomputed percentage never
    /// lowers the displayed value, even when the item total grows as
    /// downloads arrive.
    pub fn record_progress(&mut self, processed: usize, total: usize) {
        let percent = if total == 0 {
            100
        } else {
            (((processed as f64) / (total as f64)) * 100.0).round() as u8
        };
        self.progress_percent = self.progress_percent.max(percent.min(100));
    }

    pub fn record_error(&mut self, message: String) {
        self.errors.push(message);
    }

    pub fn finish(&mut self, completed_at: Option<DateTime<Utc>>) {
        self.in_progress = false;
        if let Some(at) = completed_at {
            self.last_completed_at = Some(at);
        }
    }
}
