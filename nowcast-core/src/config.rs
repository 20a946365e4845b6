use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    forecast::{FetchOptions, open_meteo},
    location::{
        LocationStrategy,
        device::{self, Coordinates},
        ipapi,
    },
};

/// Where the user's position comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// One of "ip", "device", "device-then-ip".
    pub strategy: String,
    pub ip_lookup_url: String,
    pub device_timeout_secs: u64,
    /// Pinned device position; both must be set to be used.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            strategy: LocationStrategy::Ip.to_string(),
            ip_lookup_url: ipapi::DEFAULT_URL.to_string(),
            device_timeout_secs: device::DEFAULT_TIMEOUT.as_secs(),
            latitude: None,
            longitude: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub base_url: String,
    /// Accept cached forecast responses up to this age; 0 disables caching.
    pub max_age_secs: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { base_url: open_meteo::DEFAULT_BASE_URL.to_string(), max_age_secs: 0 }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [location]
/// strategy = "device-then-ip"
/// latitude = 52.52
/// longitude = 13.41
///
/// [forecast]
/// max_age_secs = 600
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub location: LocationConfig,
    pub forecast: ForecastConfig,
}

impl Config {
    /// Return the location strategy as a strongly-typed LocationStrategy.
    pub fn location_strategy(&self) -> Result<LocationStrategy> {
        LocationStrategy::try_from(self.location.strategy.as_str())
    }

    pub fn set_location_strategy(&mut self, strategy: LocationStrategy) {
        self.location.strategy = strategy.to_string();
    }

    pub fn device_position(&self) -> Option<Coordinates> {
        match (self.location.latitude, self.location.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        }
    }

    pub fn set_device_position(&mut self, latitude: f64, longitude: f64) -> Result<()> {
        let position = Coordinates { latitude, longitude };
        if !position.is_valid() {
            return Err(anyhow!(
                "Position {latitude}, {longitude} is out of range.\n\
                 Latitude must be within -90..=90 and longitude within -180..=180."
            ));
        }

        self.location.latitude = Some(latitude);
        self.location.longitude = Some(longitude);
        Ok(())
    }

    pub fn clear_device_position(&mut self) {
        self.location.latitude = None;
        self.location.longitude = None;
    }

    pub fn fetch_options(&self) -> FetchOptions {
        match self.forecast.max_age_secs {
            0 => FetchOptions::no_store(),
            secs => FetchOptions::max_age(Duration::from_secs(secs)),
        }
    }

    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "nowcast", "nowcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
