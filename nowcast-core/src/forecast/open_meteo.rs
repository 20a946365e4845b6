use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url, header::CACHE_CONTROL};
use tracing::debug;

use crate::{
    error::{FetchError, truncate_body},
    model::RawForecastPayload,
};

use super::{FetchOptions, ForecastFetcher};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";
const DEFAULT_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";

const HOURLY: &str = "temperature_2m,relativehumidity_2m,precipitation_probability,is_day";
const DAILY: &str = "weathercode,temperature_2m_max,temperature_2m_min";

#[derive(Debug, Clone)]
pub struct OpenMeteoFetcher {
    endpoint: String,
    http: Client,
}

impl OpenMeteoFetcher {
    pub fn new() -> Self {
        Self { endpoint: DEFAULT_ENDPOINT.to_string(), http: Client::new() }
    }

    /// Point the fetcher at another Open-Meteo compatible host.
    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        let endpoint = format!("{}/v1/forecast", base_url.trim_end_matches('/'));
        Url::parse(&endpoint).with_context(|| format!("Invalid forecast base URL: {base_url}"))?;

        Ok(Self { endpoint, http: Client::new() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for OpenMeteoFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ForecastFetcher for OpenMeteoFetcher {
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        options: &FetchOptions,
    ) -> Result<RawForecastPayload, FetchError> {
        debug!(latitude, longitude, endpoint = %self.endpoint, "requesting forecast");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("latitude", latitude.to_string()), ("longitude", longitude.to_string())])
            .query(&[
                ("current_weather", "true"),
                ("hourly", HOURLY),
                ("daily", DAILY),
                ("timezone", "auto"),
                ("models", "best_match"),
            ])
            .header(CACHE_CONTROL, options.freshness.cache_control())
            .send()
            .await
            .map_err(|e| FetchError::Provider(format!("Failed to send request to Open-Meteo: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            FetchError::Provider(format!("Failed to read Open-Meteo response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(FetchError::Provider(format!(
                "Open-Meteo request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| FetchError::Provider(format!("Failed to parse Open-Meteo JSON: {e}")))
    }
}
