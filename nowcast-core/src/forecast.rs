use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;

use crate::{config::Config, error::FetchError, model::RawForecastPayload};

pub mod open_meteo;

pub use open_meteo::OpenMeteoFetcher;

/// How stale a response the transport may hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    #[default]
    NoStore,
    MaxAge(Duration),
}

impl Freshness {
    /// Value for the `Cache-Control` request header.
    pub fn cache_control(&self) -> String {
        match self {
            Freshness::NoStore => "no-store".to_string(),
            Freshness::MaxAge(age) => format!("max-age={}", age.as_secs()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchOptions {
    pub freshness: Freshness,
}

impl FetchOptions {
    pub fn no_store() -> Self {
        Self { freshness: Freshness::NoStore }
    }

    pub fn max_age(age: Duration) -> Self {
        Self { freshness: Freshness::MaxAge(age) }
    }
}

#[async_trait]
pub trait ForecastFetcher: Send + Sync + Debug {
    /// One request, no retries. Any failure is a [`FetchError::Provider`].
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        options: &FetchOptions,
    ) -> Result<RawForecastPayload, FetchError>;
}

/// Construct the forecast fetcher described by `config`.
pub fn fetcher_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastFetcher>> {
    let fetcher = OpenMeteoFetcher::with_base_url(&config.forecast.base_url)?;
    Ok(Box::new(fetcher))
}
