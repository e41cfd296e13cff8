use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::model::{ScrapeRequest, ScrapeResponse};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// HTTP client for the batch scrape endpoint.
#[derive(Debug, Clone)]
pub struct ScrapeClient {
    client: Client,
    endpoint: Url,
}

impl ScrapeClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let endpoint = endpoint_url(&config.server_url, &config.endpoint)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends all `urls` in one request and returns the decoded batch.
    ///
    /// Any non-2xx status fails the whole batch.
    pub async fn scrape(&self, urls: &[String]) -> Result<ScrapeResponse> {
        log::info!("Submitting {} URL(s) to {}", urls.len(), self.endpoint);

        let body = ScrapeRequest {
            urls: urls.to_vec(),
        };
        let res = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            log::warn!("Scrape endpoint answered {}", status);
            return Err(Error::Status(status));
        }

        let text = res.text().await?;
        log::debug!("Response length: {} bytes", text.len());

        serde_json::from_str(&text).map_err(|e| Error::Decode(e.to_string()))
    }
}

/// `endpoint` appended to whatever path `server_url` already carries.
fn endpoint_url(server_url: &str, endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(server_url)
        .map_err(|e| Error::Config(format!("server_url {:?}: {}", server_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!("server_url {:?} has no path", server_url)));
    }

    let prefix = url.path().trim_end_matches('/');
    let path = format!("{}/{}", prefix, endpoint.trim_start_matches('/'));
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
