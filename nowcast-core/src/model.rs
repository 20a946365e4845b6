use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// Short weekday labels shown in the forecast strip, Monday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub fn weekday_label(day: Weekday) -> &'static str {
    WEEKDAY_LABELS[day.num_days_from_monday() as usize]
}

/// Where the forecast is for.
///
/// `city` is `None` when the coordinates came straight from a device position
/// and no name was resolved for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(city: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { city: Some(city.into()), latitude, longitude }
    }

    pub fn from_coords(latitude: f64, longitude: f64) -> Self {
        Self { city: None, latitude, longitude }
    }

    /// City name if known, otherwise the coordinates.
    pub fn display_name(&self) -> String {
        match &self.city {
            Some(city) if !city.is_empty() => city.clone(),
            _ => format!("{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }
}

/// Forecast body as returned by Open-Meteo for the request built in
/// [`crate::forecast::open_meteo`]. All per-field arrays are positionally
/// aligned with their `time` array.
#[derive(Debug, Clone, Deserialize)]
pub struct RawForecastPayload {
    /// Offset of the location's timezone; hourly times are wall-clock times in it.
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub current_weather: RawCurrentWeather,
    pub hourly: RawHourly,
    pub daily: RawDaily,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrentWeather {
    pub temperature: f64,
    pub windspeed: f64,
    pub weathercode: i32,
    pub is_day: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHourly {
    #[serde(deserialize_with = "local_minutes::deserialize")]
    pub time: Vec<NaiveDateTime>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub relativehumidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    pub is_day: Vec<Option<u8>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDaily {
    pub time: Vec<NaiveDate>,
    pub weathercode: Vec<i32>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
}

/// Conditions right now, in display units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temperature_c: i32,
    pub min_temperature_today_c: i32,
    /// `None` when no hourly slot covers the current time.
    pub humidity_pct: Option<u8>,
    /// km/h, one decimal place.
    pub wind_kmh: f64,
    pub precipitation_pct: Option<u8>,
    pub condition_code: i32,
    pub is_day: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEntry {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub max_temp_c: i32,
    pub min_temp_c: i32,
    pub condition_code: i32,
}

impl DailyEntry {
    pub fn weekday_label(&self) -> &'static str {
        weekday_label(self.weekday)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedForecast {
    pub current: CurrentConditions,
    /// One entry per provider day, oldest first; index 0 is today.
    pub daily: Vec<DailyEntry>,
}

impl NormalizedForecast {
    /// Days after today.
    pub fn upcoming(&self) -> &[DailyEntry] {
        self.daily.get(1..).unwrap_or_default()
    }
}

/// Open-Meteo writes hourly times as `2024-03-01T14:00`, without seconds or offset.
mod local_minutes {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, de::Error};

    const FORMAT: &str = "%Y-%m-%dT%H:%M";

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| {
                NaiveDateTime::parse_from_str(s, FORMAT)
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                    .map_err(|e| D::Error::custom(format!("invalid hourly time '{s}': {e}")))
            })
            .collect()
    }
}
