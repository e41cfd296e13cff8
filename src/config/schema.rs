use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    /// Base URL of the scrape service
    #[serde(default = "default_server_url")]
    #[validate(url)]
    pub server_url: String,

    #[serde(default = "default_endpoint")]
    #[validate(custom = "validate_endpoint")]
    pub endpoint: String,

    /// Upper bound for the whole batch request
    #[serde(default = "default_timeout")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    #[validate(range(min = 1))]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    #[validate(length(min = 1))]
    pub user_agent: String,

    /// Pre-fill a "Fetching" row per URL while the request is in flight
    #[serde(default = "default_show_pending")]
    pub show_pending: bool,

    #[serde(default)]
    pub output: Option<OutputConfig>,

    /// Optional path to a parent configuration file to inherit from
    #[serde(default)]
    pub extends: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
            show_pending: default_show_pending(),
            output: None,
            extends: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    Console,
    Html {
        path: String,
    },
    Json {
        path: String,
    },
    Csv {
        path: String,
    },
    Sqlite {
        path: String,
        #[serde(default = "default_table_name")]
        table: String,
    },
}

impl OutputConfig {
    /// Replaces the path and SQLite table name of an already chosen output.
    ///
    /// Values that the output kind cannot use are an error rather than ignored.
    pub fn with_overrides(self, path: Option<String>, table: Option<String>) -> Result<Self> {
        if table.is_some() && !matches!(self, OutputConfig::Sqlite { .. }) {
            return Err(Error::Config(
                "a table name only applies to sqlite output".to_string(),
            ));
        }

        Ok(match (self, path) {
            (OutputConfig::Console, Some(_)) => {
                return Err(Error::Config(
                    "an output path does not apply to console output".to_string(),
                ));
            }
            (OutputConfig::Html { .. }, Some(path)) => OutputConfig::Html { path },
            (OutputConfig::Json { .. }, Some(path)) => OutputConfig::Json { path },
            (OutputConfig::Csv { .. }, Some(path)) => OutputConfig::Csv { path },
            (OutputConfig::Sqlite { path: old, table: old_table }, path) => OutputConfig::Sqlite {
                path: path.unwrap_or(old),
                table: table.unwrap_or(old_table),
            },
            (output, None) => output,
        })
    }
}

/// Values accepted from `VIDSCRAPE_*` environment variables.
#[derive(Debug, Default, Deserialize)]
pub struct EnvOverrides {
    pub server_url: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub show_pending: Option<bool>,
}

fn validate_endpoint(endpoint: &str) -> std::result::Result<(), ValidationError> {
    if endpoint.starts_with('/') {
        Ok(())
    } else {
        Err(ValidationError::new("endpoint_must_start_with_slash"))
    }
}

pub(crate) fn default_server_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

pub(crate) fn default_endpoint() -> String {
    "/api/scrape".to_string()
}

pub(crate) fn default_timeout() -> u64 {
    120
}

pub(crate) fn default_connect_timeout() -> u64 {
    20
}

pub(crate) fn default_user_agent() -> String {
    concat!("vidscrape/", env!("CARGO_PKG_VERSION")).to_string()
}

pub(crate) fn default_show_pending() -> bool {
    true
}

pub(crate) fn default_table_name() -> String {
    "scrape_results".to_string()
}
