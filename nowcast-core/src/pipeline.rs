//! Location -> forecast -> normalized report, for a single request.
//!
//! Nothing here retries. A failing step is logged, recorded in the report and
//! the remaining steps that depend on it are skipped, so the presenter can
//! still show whatever was obtained.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    classify::{ConditionCategory, classify, classify_day},
    error::PipelineError,
    forecast::{FetchOptions, ForecastFetcher},
    location::LocationResolver,
    model::{DailyEntry, Location, NormalizedForecast},
    normalize::normalize,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedDay<'a> {
    pub entry: &'a DailyEntry,
    /// `None` for codes without a category; show no illustration.
    pub category: Option<ConditionCategory>,
}

#[derive(Debug, Clone, Default)]
pub struct WeatherReport {
    pub location: Option<Location>,
    pub forecast: Option<NormalizedForecast>,
    /// Failures in the order they happened.
    pub errors: Vec<PipelineError>,
}

impl WeatherReport {
    pub fn is_complete(&self) -> bool {
        self.location.is_some() && self.forecast.is_some()
    }

    pub fn current_category(&self) -> Option<ConditionCategory> {
        let current = &self.forecast.as_ref()?.current;
        classify(current.condition_code, current.is_day)
    }

    /// The forecast strip: every day after today with its category.
    pub fn upcoming_days(&self) -> Vec<ClassifiedDay<'_>> {
        self.forecast
            .iter()
            .flat_map(|f| f.upcoming())
            .map(|entry| ClassifiedDay { entry, category: classify_day(entry.condition_code) })
            .collect()
    }
}

/// Fetch and normalize the forecast for a known location.
pub async fn forecast_for(
    fetcher: &dyn ForecastFetcher,
    location: &Location,
    options: &FetchOptions,
    now: DateTime<Utc>,
) -> Result<NormalizedForecast, PipelineError> {
    let payload = fetcher.fetch(location.latitude, location.longitude, options).await?;
    let forecast = normalize(&payload, now)?;
    debug!(days = forecast.daily.len(), "forecast normalized");
    Ok(forecast)
}

/// Run the whole pipeline. Never fails; see [`WeatherReport::errors`].
pub async fn run(
    resolver: &dyn LocationResolver,
    fetcher: &dyn ForecastFetcher,
    options: &FetchOptions,
    now: DateTime<Utc>,
) -> WeatherReport {
    let mut report = WeatherReport::default();

    let location = match resolver.resolve().await {
        Ok(location) => location,
        Err(e) => {
            warn!(error = %e, "location unavailable, skipping forecast");
            report.errors.push(e.into());
            return report;
        }
    };
    debug!(location = %location.display_name(), "location resolved");

    match forecast_for(fetcher, &location, options, now).await {
        Ok(forecast) => report.forecast = Some(forecast),
        Err(e) => {
            warn!(error = %e, "forecast unavailable");
            report.errors.push(e);
        }
    }

    report.location = Some(location);
    report
}
