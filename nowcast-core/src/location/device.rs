//! Device positioning: coordinates only, bounded wait.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

use crate::{error::LocationError, model::Location};

use super::LocationResolver;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    /// Hint to prefer a precise fix over a fast one.
    pub high_accuracy: bool,
    pub timeout: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self { high_accuracy: true, timeout: DEFAULT_TIMEOUT }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),
}

#[async_trait]
pub trait PositionSource: Send + Sync + Debug {
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<Coordinates, PositionError>;
}

/// A position pinned in configuration, e.g. for a stationary machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedPosition {
    position: Option<Coordinates>,
}

impl FixedPosition {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<Coordinates, PositionError> {
        self.position.ok_or_else(|| {
            PositionError::PositionUnavailable("no device position configured".to_string())
        })
    }
}

#[derive(Debug)]
pub struct DeviceResolver<S> {
    source: S,
    options: GeolocationOptions,
}

impl<S: PositionSource> DeviceResolver<S> {
    pub fn new(source: S, options: GeolocationOptions) -> Self {
        Self { source, options }
    }
}

#[async_trait]
impl<S: PositionSource> LocationResolver for DeviceResolver<S> {
    async fn resolve(&self) -> Result<Location, LocationError> {
        let position = timeout(self.options.timeout, self.source.current_position(&self.options))
            .await
            .map_err(|_| {
                LocationError::Unavailable(format!(
                    "no position within {} ms",
                    self.options.timeout.as_millis()
                ))
            })?
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if !position.is_valid() {
            return Err(LocationError::Unavailable(format!(
                "position out of range: {}, {}",
                position.latitude, position.longitude
            )));
        }

        debug!(latitude = position.latitude, longitude = position.longitude, "device position acquired");
        Ok(Location::from_coords(position.latitude, position.longitude))
    }
}
