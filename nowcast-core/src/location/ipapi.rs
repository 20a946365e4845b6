use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url, header::CACHE_CONTROL};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{LocationError, truncate_body},
    model::Location,
};

use super::LocationResolver;

pub const DEFAULT_URL: &str = "https://ipapi.co/json/";

/// Geolocates the caller's public IP address with a single `GET`.
#[derive(Debug, Clone)]
pub struct IpLookupResolver {
    url: String,
    http: Client,
}

impl IpLookupResolver {
    pub fn new() -> Self {
        Self { url: DEFAULT_URL.to_string(), http: Client::new() }
    }

    pub fn with_url(url: &str) -> anyhow::Result<Self> {
        Url::parse(url).with_context(|| format!("Invalid IP lookup URL: {url}"))?;
        Ok(Self { url: url.to_string(), http: Client::new() })
    }
}

impl Default for IpLookupResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// The fields we use from ipapi's `/json/` answer. Rate limiting and reserved
/// addresses come back as `200` with `error: true` and a `reason`.
#[derive(Debug, Deserialize)]
struct IpapiResponse {
    city: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

#[async_trait]
impl LocationResolver for IpLookupResolver {
    async fn resolve(&self) -> Result<Location, LocationError> {
        debug!(url = %self.url, "looking up location by IP");

        let res = self
            .http
            .get(&self.url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| LocationError::Provider(format!("Failed to send IP lookup request: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| LocationError::Provider(format!("Failed to read IP lookup body: {e}")))?;

        if !status.is_success() {
            return Err(LocationError::Provider(format!(
                "IP lookup failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: IpapiResponse = serde_json::from_str(&body)
            .map_err(|e| LocationError::Provider(format!("Failed to parse IP lookup JSON: {e}")))?;

        if parsed.error {
            return Err(LocationError::Provider(format!(
                "IP lookup refused: {}",
                parsed.reason.as_deref().unwrap_or("no reason given")
            )));
        }

        match (parsed.latitude, parsed.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Location {
                city: parsed.city.filter(|c| !c.is_empty()),
                latitude,
                longitude,
            }),
            _ => Err(LocationError::Provider(format!(
                "IP lookup response has no coordinates: {}",
                truncate_body(&body),
            ))),
        }
    }
}
