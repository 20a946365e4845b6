use crate::{
    Config,
    error::LocationError,
    location::{
        device::{DeviceResolver, FixedPosition, GeolocationOptions},
        ipapi::IpLookupResolver,
    },
    model::Location,
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, time::Duration};
use tracing::{debug, warn};

pub mod device;
pub mod ipapi;

/// How the deployment finds out where the user is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationStrategy {
    /// Geolocate the public IP address.
    Ip,
    /// Ask the device for a position.
    Device,
    /// Ask the device, fall back to the IP lookup if no position is available.
    DeviceThenIp,
}

impl LocationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationStrategy::Ip => "ip",
            LocationStrategy::Device => "device",
            LocationStrategy::DeviceThenIp => "device-then-ip",
        }
    }

    pub const fn all() -> &'static [LocationStrategy] {
        &[LocationStrategy::Ip, LocationStrategy::Device, LocationStrategy::DeviceThenIp]
    }
}

impl std::fmt::Display for LocationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LocationStrategy {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "ip" => Ok(LocationStrategy::Ip),
            "device" => Ok(LocationStrategy::Device),
            "device-then-ip" => Ok(LocationStrategy::DeviceThenIp),
            _ => Err(anyhow::anyhow!(
                "Unknown location strategy '{value}'. Supported strategies: ip, device, device-then-ip."
            )),
        }
    }
}

#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    /// Resolve once. Failures are returned as-is; nothing is retried.
    async fn resolve(&self) -> Result<Location, LocationError>;
}

/// Tries `primary`, and `fallback` only when the primary reports
/// [`LocationError::Unavailable`]. Provider errors are returned unchanged.
#[derive(Debug)]
pub struct FallbackResolver {
    primary: Box<dyn LocationResolver>,
    fallback: Box<dyn LocationResolver>,
}

impl FallbackResolver {
    pub fn new(primary: Box<dyn LocationResolver>, fallback: Box<dyn LocationResolver>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl LocationResolver for FallbackResolver {
    async fn resolve(&self) -> Result<Location, LocationError> {
        match self.primary.resolve().await {
            Err(LocationError::Unavailable(reason)) => {
                warn!(%reason, "primary location source unavailable, falling back");
                self.fallback.resolve().await
            }
            other => other,
        }
    }
}

/// Construct the resolver for the configured strategy.
pub fn resolver_from_config(config: &Config) -> anyhow::Result<Box<dyn LocationResolver>> {
    let strategy = config.location_strategy()?;
    debug!(%strategy, "building location resolver");

    let ip = || -> anyhow::Result<Box<dyn LocationResolver>> {
        Ok(Box::new(IpLookupResolver::with_url(&config.location.ip_lookup_url)?))
    };
    let device = || -> Box<dyn LocationResolver> {
        let options = GeolocationOptions {
            high_accuracy: true,
            timeout: Duration::from_secs(config.location.device_timeout_secs),
        };
        Box::new(DeviceResolver::new(FixedPosition::new(config.device_position()), options))
    };

    let boxed: Box<dyn LocationResolver> = match strategy {
        LocationStrategy::Ip => ip()?,
        LocationStrategy::Device => device(),
        LocationStrategy::DeviceThenIp => Box::new(FallbackResolver::new(device(), ip()?)),
    };

    Ok(boxed)
}
