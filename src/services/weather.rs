//! Weather source client for the OpenWeather current-conditions API.

use crate::{config::WeatherConfig, models::WeatherReading};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Errors raised while fetching current conditions
#[derive(Debug, thiserror::Error)]
pub enum WeatherClientError {
    #[error("weather API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather API returned status {code}: {}", truncate_body(.body))]
    UpstreamStatus { code: u16, body: String },

    #[error("failed to decode weather API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid weather API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Anything that can report current weather for a city.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, city: &str) -> Result<WeatherReading, WeatherClientError>;
}

/// reqwest-backed client with a bounded per-request timeout. No retries.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherClientError> {
        let endpoint = Url::parse(&config.api_url)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn fetch(&self, city: &str) -> Result<WeatherReading, WeatherClientError> {
        debug!(city = %city, endpoint = %self.endpoint, "Requesting current weather");

        let res = self
            .http
            .get(self.endpoint.clone())
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status != StatusCode::OK {
            warn!(
                city = %city,
                status = status.as_u16(),
                body = %truncate_body(&body),
                "Weather API returned non-OK status"
            );
            return Err(WeatherClientError::UpstreamStatus {
                code: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Shorten a response body for logs and error messages.
pub fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
