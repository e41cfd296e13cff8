use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Environment override error: {0}")]
    Environment(#[from] ::config::ConfigError),

    /// Raised before any request is sent.
    #[error("Please paste at least one video URL.")]
    EmptyInput,

    #[error("A submission is already in progress")]
    Busy,

    #[error("Server responded with HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Batch-level failures that abort rendering of a submission.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Status(_) | Error::Http(_) | Error::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
