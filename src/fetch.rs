use std::time::Duration;

use reqwest::Url;
use tracing::{error, info};

use crate::config::Config;
use crate::error::FetchError;
use crate::models::WeatherReading;
use crate::parser::{self, CompiledSelectors};
use crate::pipeline::ReadingSource;

/// Fetches the configured page over HTTP and extracts one reading from it.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    selectors: CompiledSelectors,
}

impl HttpSource {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let selectors = CompiledSelectors::compile(&config.selectors)?;
        let client = build_client(config.timeout(), &config.user_agent)?;
        Ok(Self {
            client,
            url: config.url.clone(),
            selectors,
        })
    }

    /// Single GET, no retry. Transport failures and non-2xx statuses are
    /// reported as [`FetchError::UnreachableSource`].
    pub async fn fetch_page(&self) -> Result<String, FetchError> {
        let url = parse_url(&self.url).inspect_err(|e| error!("{}", e))?;

        let body = self
            .get_text(url)
            .await
            .map_err(FetchError::UnreachableSource)
            .inspect_err(|e| {
                error!("Troubles with connection, data will be taken from the database: {}", e)
            })?;

        info!("The page was found: {} ({} bytes)", self.url, body.len());
        Ok(body)
    }

    async fn get_text(&self, url: Url) -> reqwest::Result<String> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

impl ReadingSource for HttpSource {
    async fn fetch_reading(&self) -> Result<WeatherReading, FetchError> {
        let html = self.fetch_page().await?;
        let reading = parser::extract_reading(&html, &self.selectors)
            .inspect_err(|e| error!("Failed to extract reading: {}", e))?;
        info!("The page was parsed");
        Ok(reading)
    }
}

fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(FetchError::Client)
}

fn parse_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw).map_err(|e| FetchError::MalformedSource {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::MalformedSource {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
