use crate::config::schema::{self, ClientConfig, EnvOverrides, OutputConfig};
use crate::error::{Error, Result};
use crate::output::{
    OutputHandler, console::ConsoleOutput, csv::CsvOutput, html::HtmlOutput, json::JsonOutput,
    sqlite::SqliteOutput,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use validator::Validate;

const ENV_PREFIX: &str = "VIDSCRAPE";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path` (and its `extends` chain), applies `VIDSCRAPE_*`
    /// environment overrides, then validates the result.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
        let path = path.as_ref();
        let mut visited = HashSet::new();
        let config = Self::load_with_inheritance(path, &mut visited)?;
        Self::finish(config)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> Result<ClientConfig> {
        Self::finish(ClientConfig::default())
    }

    fn finish(config: ClientConfig) -> Result<ClientConfig> {
        let config = Self::apply_overrides(config, Self::env_overrides()?);
        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &ClientConfig) -> Result<()> {
        config.validate()?;
        if let Some(OutputConfig::Sqlite { table, .. }) = &config.output {
            if !is_identifier(table) {
                return Err(Error::Config(format!("Invalid SQLite table name: {:?}", table)));
            }
        }
        Ok(())
    }

    fn load_with_inheritance(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<ClientConfig> {
        let path = fs::canonicalize(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        if visited.contains(&path) {
            return Err(Error::Config(format!(
                "Circular inheritance detected involving {}",
                path.display()
            )));
        }
        visited.insert(path.clone());

        let config = Self::load_file(&path)?;

        match config.extends.clone() {
            Some(parent_path_str) => {
                let parent_path = path
                    .parent()
                    .ok_or_else(|| {
                        Error::Config(format!(
                            "Cannot determine parent directory for {}",
                            path.display()
                        ))
                    })?
                    .join(&parent_path_str);

                let parent_config = Self::load_with_inheritance(&parent_path, visited)?;
                Ok(Self::merge_configs(parent_config, config))
            }
            None => Ok(config),
        }
    }

    fn load_file(path: &Path) -> Result<ClientConfig> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            _ => Err(Error::Config(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }

    // A child value wins whenever it differs from the built-in default.
    fn merge_configs(mut parent: ClientConfig, child: ClientConfig) -> ClientConfig {
        if child.server_url != schema::default_server_url() {
            parent.server_url = child.server_url;
        }
        if child.endpoint != schema::default_endpoint() {
            parent.endpoint = child.endpoint;
        }
        if child.timeout_secs != schema::default_timeout() {
            parent.timeout_secs = child.timeout_secs;
        }
        if child.connect_timeout_secs != schema::default_connect_timeout() {
            parent.connect_timeout_secs = child.connect_timeout_secs;
        }
        if child.user_agent != schema::default_user_agent() {
            parent.user_agent = child.user_agent;
        }
        if child.show_pending != schema::default_show_pending() {
            parent.show_pending = child.show_pending;
        }
        if child.output.is_some() {
            parent.output = child.output;
        }

        parent.extends = None;
        parent
    }

    fn env_overrides() -> Result<EnvOverrides> {
        let overrides = ::config::Config::builder()
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize::<EnvOverrides>()?;
        Ok(overrides)
    }

    pub fn apply_overrides(mut config: ClientConfig, overrides: EnvOverrides) -> ClientConfig {
        if let Some(v) = overrides.server_url {
            log::debug!("server_url overridden from environment");
            config.server_url = v;
        }
        if let Some(v) = overrides.endpoint {
            config.endpoint = v;
        }
        if let Some(v) = overrides.timeout_secs {
            config.timeout_secs = v;
        }
        if let Some(v) = overrides.connect_timeout_secs {
            config.connect_timeout_secs = v;
        }
        if let Some(v) = overrides.user_agent {
            config.user_agent = v;
        }
        if let Some(v) = overrides.show_pending {
            config.show_pending = v;
        }
        config
    }

    pub async fn create_output(
        config: &ClientConfig,
        multi: Option<Arc<indicatif::MultiProgress>>,
    ) -> Result<Box<dyn OutputHandler>> {
        let handler: Box<dyn OutputHandler> = match &config.output {
            None | Some(OutputConfig::Console) => Box::new(ConsoleOutput::new(multi)),
            Some(OutputConfig::Html { path }) => Box::new(HtmlOutput::new(PathBuf::from(path))?),
            Some(OutputConfig::Json { path }) => Box::new(JsonOutput::new(PathBuf::from(path))?),
            Some(OutputConfig::Csv { path }) => Box::new(CsvOutput::new(PathBuf::from(path))?),
            Some(OutputConfig::Sqlite { path, table }) => {
                Box::new(SqliteOutput::new(PathBuf::from(path), table.clone()).await?)
            }
        };
        Ok(handler)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
