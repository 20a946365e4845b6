//! Raw Open-Meteo payload -> display-ready forecast.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};
use tracing::debug;

use crate::{
    error::NormalizeError,
    model::{CurrentConditions, DailyEntry, NormalizedForecast, RawDaily, RawForecastPayload},
};

/// Build a [`NormalizedForecast`] from a provider payload as of `now`.
///
/// Temperatures are rounded up to whole degrees, wind to one decimal place.
/// Humidity and precipitation come from the hourly slot that has most recently
/// started; when no such slot exists they are `None`.
pub fn normalize(
    payload: &RawForecastPayload,
    now: DateTime<Utc>,
) -> Result<NormalizedForecast, NormalizeError> {
    check_daily_alignment(&payload.daily)?;

    let local_now = local_wall_clock(now, payload.utc_offset_seconds);
    let hour = current_hour_index(&payload.hourly.time, local_now);
    debug!(?local_now, ?hour, "resolved current hour");

    let daily: Vec<DailyEntry> = payload
        .daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| DailyEntry {
            date: *date,
            weekday: date.weekday(),
            max_temp_c: ceil_c(payload.daily.temperature_2m_max[i]),
            min_temp_c: ceil_c(payload.daily.temperature_2m_min[i]),
            condition_code: payload.daily.weathercode[i],
        })
        .collect();

    let cw = &payload.current_weather;
    let current = CurrentConditions {
        temperature_c: ceil_c(cw.temperature),
        min_temperature_today_c: daily[0].min_temp_c,
        humidity_pct: hour.and_then(|i| percent_at(&payload.hourly.relativehumidity_2m, i)),
        wind_kmh: one_decimal(cw.windspeed),
        precipitation_pct: hour
            .and_then(|i| percent_at(&payload.hourly.precipitation_probability, i)),
        condition_code: cw.weathercode,
        is_day: cw.is_day != 0,
    };

    Ok(NormalizedForecast { current, daily })
}

/// Index of the hourly slot containing `now`: the entry just before the first
/// timestamp at or after `now`.
///
/// `None` if every timestamp is in the past, or if the first one is already at
/// or after `now`.
pub fn current_hour_index(times: &[NaiveDateTime], now: NaiveDateTime) -> Option<usize> {
    let next = times.iter().position(|t| *t >= now)?;
    next.checked_sub(1)
}

fn check_daily_alignment(daily: &RawDaily) -> Result<(), NormalizeError> {
    let expected = daily.time.len();
    if expected == 0 {
        return Err(NormalizeError::EmptyDaily);
    }

    let series = [
        ("weathercode", daily.weathercode.len()),
        ("temperature_2m_max", daily.temperature_2m_max.len()),
        ("temperature_2m_min", daily.temperature_2m_min.len()),
    ];
    for (series, found) in series {
        if found != expected {
            return Err(NormalizeError::MisalignedSeries { series, expected, found });
        }
    }

    Ok(())
}

/// Hourly times are wall-clock times at the location, so shift `now` the same way.
fn local_wall_clock(now: DateTime<Utc>, utc_offset_seconds: i32) -> NaiveDateTime {
    match FixedOffset::east_opt(utc_offset_seconds) {
        Some(offset) => now.with_timezone(&offset).naive_local(),
        None => now.naive_utc(),
    }
}

fn percent_at(series: &[Option<f64>], index: usize) -> Option<u8> {
    series
        .get(index)
        .copied()
        .flatten()
        .map(|v| v.round().clamp(0.0, 100.0) as u8)
}

fn ceil_c(value: f64) -> i32 {
    value.ceil() as i32
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
