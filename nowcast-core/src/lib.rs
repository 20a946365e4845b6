//! Core library for the `nowcast` CLI.
//!
//! This crate defines:
//! - Location resolution (IP lookup, device position, fallback between them)
//! - Forecast fetching from Open-Meteo
//! - Normalization of the raw forecast into display units
//! - Classification of WMO condition codes into labelled categories
//! - Configuration handling and the request pipeline tying these together
//!
//! It is used by `nowcast-cli`, but presentation is left entirely to callers.

pub mod classify;
pub mod config;
pub mod error;
pub mod forecast;
pub mod location;
pub mod model;
pub mod normalize;
pub mod pipeline;

pub use classify::{ConditionCategory, classify, classify_day};
pub use config::{Config, ForecastConfig, LocationConfig};
pub use error::{FetchError, LocationError, NormalizeError, PipelineError};
pub use forecast::{FetchOptions, ForecastFetcher, Freshness, OpenMeteoFetcher};
pub use location::{LocationResolver, LocationStrategy};
pub use model::{CurrentConditions, DailyEntry, Location, NormalizedForecast, RawForecastPayload};
pub use normalize::normalize;
pub use pipeline::WeatherReport;
