pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod output;
pub mod render;
pub mod submission;
pub mod table;

pub use client::ScrapeClient;
pub use error::{Error, Result};
pub use metrics::collector::MetricsCollector;
pub use metrics::snapshot::MetricsSnapshot;
pub use model::{ScrapeResponse, ScrapeResult, Status};
pub use submission::{Submission, SubmissionReport, SubmissionState};
pub use table::ResultsTable;
