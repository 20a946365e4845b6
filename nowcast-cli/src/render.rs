//! Plain-text presentation of a [`WeatherReport`].

use std::fmt::Write;

use chrono::{DateTime, TimeZone};
use nowcast_core::{WeatherReport, classify::ConditionRule};

const MISSING: &str = "--";

pub fn render_report<Tz>(report: &WeatherReport, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();

    let _ = writeln!(out, "{}", now.format("%A, %b %-d, %-I:%M %p"));
    let city = report.location.as_ref().map(|l| l.display_name());
    let _ = writeln!(out, "{}", city.as_deref().unwrap_or("Unknown location"));
    let _ = writeln!(out);

    match &report.forecast {
        Some(forecast) => {
            let c = &forecast.current;
            let condition = report.current_category().map(|cat| cat.label).unwrap_or(MISSING);
            let _ = writeln!(out, "{}°C  {condition}  (min {}°C)", c.temperature_c, c.min_temperature_today_c);
            let _ = writeln!(
                out,
                "Humidity {}  Wind {:.1} km/h  Precipitation {}",
                percent(c.humidity_pct),
                c.wind_kmh,
                percent(c.precipitation_pct),
            );

            let days = report.upcoming_days();
            if !days.is_empty() {
                let _ = writeln!(out);
            }
            for day in days {
                let label = day.category.map(|cat| cat.label).unwrap_or(MISSING);
                let _ = writeln!(
                    out,
                    "{}  {:>3}° / {:>3}°  {label}",
                    day.entry.weekday_label(),
                    day.entry.max_temp_c,
                    day.entry.min_temp_c,
                );
            }
        }
        None => {
            let _ = writeln!(out, "Forecast unavailable");
        }
    }

    for error in &report.errors {
        let _ = writeln!(out, "! {error}");
    }

    out
}

pub fn render_codes(rules: &[ConditionRule]) -> String {
    let mut out = String::new();
    for rule in rules {
        let codes = if rule.codes.start() == rule.codes.end() {
            rule.codes.start().to_string()
        } else {
            format!("{}-{}", rule.codes.start(), rule.codes.end())
        };
        let _ = write!(out, "{codes:>6}  {:<24}{}", rule.label, rule.day_key);
        if rule.night_key != rule.day_key {
            let _ = write!(out, " / {}", rule.night_key);
        }
        let _ = writeln!(out);
    }
    out
}

fn percent(value: Option<u8>) -> String {
    value.map(|v| format!("{v}%")).unwrap_or_else(|| MISSING.to_string())
}
