use crate::client::ScrapeClient;
use crate::error::{Error, Result};
use crate::metrics::collector::MetricsCollector;
use crate::model::ScrapeResult;
use crate::table::ResultsTable;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Rendering,
    Done,
    Failed,
}

/// What a finished submission reports back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub urls_submitted: usize,
    pub rows_rendered: usize,
    pub elapsed: Duration,
    pub message: String,
}

/// Splits free text into URLs: one per line, trimmed, blank lines dropped.
pub fn parse_urls(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Status line for a submission that ended in `err`.
pub fn failure_message(err: &Error) -> String {
    format!("Error: {}", err)
}

// Holds the in-flight flag; dropping it re-enables submission on every path.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one batch at a time from raw input to a rendered table.
pub struct Submission {
    client: ScrapeClient,
    show_pending: bool,
    table: Arc<Mutex<ResultsTable>>,
    in_flight: AtomicBool,
    metrics: Arc<MetricsCollector>,
    state_watcher: watch::Sender<SubmissionState>,
}

impl Submission {
    pub fn new(client: ScrapeClient, show_pending: bool, metrics: Option<Arc<MetricsCollector>>) -> Self {
        let (state_tx, _) = watch::channel(SubmissionState::Idle);

        Self {
            client,
            show_pending,
            table: Arc::new(Mutex::new(ResultsTable::new())),
            in_flight: AtomicBool::new(false),
            metrics: metrics.unwrap_or_else(|| Arc::new(MetricsCollector::new())),
            state_watcher: state_tx,
        }
    }

    /// Submits every URL in `input` as one batch and renders the response.
    ///
    /// Empty input and overlapping calls are rejected without touching the
    /// table or the network. A transport failure leaves the table empty.
    pub async fn submit(&self, input: &str) -> Result<SubmissionReport> {
        let urls = parse_urls(input);
        if urls.is_empty() {
            self.metrics.increment_rejected();
            return Err(Error::EmptyInput);
        }

        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            log::warn!("Rejected submission: another one is in flight");
            self.metrics.increment_rejected();
            return Err(Error::Busy);
        };

        self.set_state(SubmissionState::Submitting);
        self.metrics.record_submitted(urls.len());
        {
            let mut table = self.table.lock().await;
            table.clear();
            if self.show_pending {
                for (i, url) in urls.iter().enumerate() {
                    table.append(&ScrapeResult::pending(url.as_str()), i);
                }
            }
        }

        let start_time = Instant::now();
        let response = match self.client.scrape(&urls).await {
            Ok(response) => response,
            Err(e) => {
                self.metrics.record_failure(start_time.elapsed());
                self.table.lock().await.clear();
                self.set_state(SubmissionState::Failed);
                log::error!("Submission failed: {}", e);
                return Err(e);
            }
        };
        let elapsed = start_time.elapsed();
        self.metrics.record_success(elapsed);

        self.set_state(SubmissionState::Rendering);
        if response.results.len() != urls.len() {
            log::warn!(
                "Submitted {} URL(s) but received {} result(s)",
                urls.len(),
                response.results.len()
            );
        }

        let rows_rendered = {
            let mut table = self.table.lock().await;
            table.clear();
            for (i, result) in response.results.iter().enumerate() {
                table.append(result, i);
                self.metrics.record_row(result.status);
            }
            table.len()
        };

        self.set_state(SubmissionState::Done);
        log::info!("Rendered {} row(s) in {:?}", rows_rendered, elapsed);

        Ok(SubmissionReport {
            urls_submitted: urls.len(),
            rows_rendered,
            elapsed,
            message: format!("Done. {} URL(s).", rows_rendered),
        })
    }

    /// Copy of the current table contents.
    pub async fn table(&self) -> ResultsTable {
        self.table.lock().await.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SubmissionState {
        *self.state_watcher.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SubmissionState> {
        self.state_watcher.subscribe()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    // `send_replace` stores the value even when nobody is subscribed.
    fn set_state(&self, state: SubmissionState) {
        self.state_watcher.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_urls_trims_and_drops_blank_lines() {
        let input = "  https://vk.com/video1  \n\n\t\nhttps://vk.com/video2\r\n   ";
        assert_eq!(
            parse_urls(input),
            vec!["https://vk.com/video1", "https://vk.com/video2"]
        );
    }

    #[test]
    fn parse_urls_keeps_order_and_duplicates() {
        assert_eq!(parse_urls("b\na\nb"), vec!["b", "a", "b"]);
    }

    #[test]
    fn parse_urls_of_blank_input_is_empty() {
        assert!(parse_urls("").is_empty());
        assert!(parse_urls(" \n \n").is_empty());
    }

    #[test]
    fn in_flight_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = InFlight::acquire(&flag);
        assert!(guard.is_some());
        assert!(InFlight::acquire(&flag).is_none());
        drop(guard);
        assert!(InFlight::acquire(&flag).is_some());
    }

    #[test]
    fn failure_message_is_prefixed() {
        assert_eq!(
            failure_message(&Error::Decode("eof".into())),
            "Error: Invalid response body: eof"
        );
    }
}
