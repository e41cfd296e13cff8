use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub submissions_total: u64,
    pub submissions_succeeded: u64,
    pub submissions_failed: u64,
    pub submissions_rejected: u64,
    pub urls_submitted: u64,
    pub rows_rendered: u64,
    pub items_success: u64,
    pub items_error: u64,
    pub item_success_rate: f64,
    pub avg_response_time_ms: u64,
    pub elapsed_seconds: f64,
}
