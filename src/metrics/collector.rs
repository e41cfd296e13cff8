use crate::metrics::snapshot::MetricsSnapshot;
use crate::model::Status;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct MetricsCollector {
    submissions_total: Arc<AtomicU64>,
    submissions_succeeded: Arc<AtomicU64>,
    submissions_failed: Arc<AtomicU64>,
    submissions_rejected: Arc<AtomicU64>,
    urls_submitted: Arc<AtomicU64>,
    rows_rendered: Arc<AtomicU64>,
    items_success: Arc<AtomicU64>,
    items_error: Arc<AtomicU64>,
    requests_timed: Arc<AtomicU64>,
    total_response_time_ms: Arc<AtomicU64>,
    start_time: Arc<Instant>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            submissions_total: Arc::new(AtomicU64::new(0)),
            submissions_succeeded: Arc::new(AtomicU64::new(0)),
            submissions_failed: Arc::new(AtomicU64::new(0)),
            submissions_rejected: Arc::new(AtomicU64::new(0)),
            urls_submitted: Arc::new(AtomicU64::new(0)),
            rows_rendered: Arc::new(AtomicU64::new(0)),
            items_success: Arc::new(AtomicU64::new(0)),
            items_error: Arc::new(AtomicU64::new(0)),
            requests_timed: Arc::new(AtomicU64::new(0)),
            total_response_time_ms: Arc::new(AtomicU64::new(0)),
            start_time: Arc::new(Instant::now()),
        }
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validation failures and overlapping submits.
    pub fn increment_rejected(&self) {
        self.submissions_rejected.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_submitted(&self, urls: usize) {
        self.submissions_total.fetch_add(1, Ordering::SeqCst);
        self.urls_submitted.fetch_add(urls as u64, Ordering::SeqCst);
    }

    pub fn record_row(&self, status: Status) {
        self.rows_rendered.fetch_add(1, Ordering::SeqCst);
        match status {
            Status::Success => {
                self.items_success.fetch_add(1, Ordering::SeqCst);
            }
            Status::Error => {
                self.items_error.fetch_add(1, Ordering::SeqCst);
            }
            Status::Fetching | Status::Unknown => {}
        }
    }

    pub fn record_success(&self, duration: Duration) {
        self.submissions_succeeded.fetch_add(1, Ordering::SeqCst);
        self.record_time(duration);
    }

    pub fn record_failure(&self, duration: Duration) {
        self.submissions_failed.fetch_add(1, Ordering::SeqCst);
        self.record_time(duration);
    }

    fn record_time(&self, duration: Duration) {
        self.requests_timed.fetch_add(1, Ordering::SeqCst);
        self.total_response_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let timed = self.requests_timed.load(Ordering::SeqCst);
        let total_time = self.total_response_time_ms.load(Ordering::SeqCst);
        let success = self.items_success.load(Ordering::SeqCst);
        let error = self.items_error.load(Ordering::SeqCst);

        let item_success_rate = if success + error > 0 {
            (success as f64 / (success + error) as f64) * 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            submissions_total: self.submissions_total.load(Ordering::SeqCst),
            submissions_succeeded: self.submissions_succeeded.load(Ordering::SeqCst),
            submissions_failed: self.submissions_failed.load(Ordering::SeqCst),
            submissions_rejected: self.submissions_rejected.load(Ordering::SeqCst),
            urls_submitted: self.urls_submitted.load(Ordering::SeqCst),
            rows_rendered: self.rows_rendered.load(Ordering::SeqCst),
            items_success: success,
            items_error: error,
            item_success_rate,
            avg_response_time_ms: if timed > 0 { total_time / timed } else { 0 },
            elapsed_seconds: self.start_time.elapsed().as_secs_f64(),
        }
    }
}
