use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Select};
use nowcast_core::{
    Config, LocationStrategy, classify, forecast::fetcher_from_config,
    location::resolver_from_config, pipeline,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nowcast", version, about = "Current weather and forecast for where you are")]
pub struct Cli {
    /// Log pipeline steps to stderr (RUST_LOG overrides).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively choose how the location is found and how fresh forecasts must be.
    Configure,

    /// Show current conditions and the coming days.
    Show {
        /// Override the configured location strategy: ip, device or device-then-ip.
        #[arg(long)]
        strategy: Option<String>,

        /// Use this position as the device position (requires --lon).
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Use this position as the device position (requires --lat).
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Accept cached forecast responses up to this many seconds old.
        #[arg(long)]
        max_age: Option<u64>,
    },

    /// List the condition codes and their categories.
    Codes,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { strategy, lat, lon, max_age } => {
                let mut config = Config::load()?;
                if let Some(strategy) = strategy {
                    config.set_location_strategy(LocationStrategy::try_from(strategy.as_str())?);
                }
                if let (Some(lat), Some(lon)) = (lat, lon) {
                    config.set_device_position(lat, lon)?;
                }
                if let Some(max_age) = max_age {
                    config.forecast.max_age_secs = max_age;
                }
                show(&config).await
            }
            Command::Codes => {
                print!("{}", render::render_codes(classify::rules()));
                Ok(())
            }
        }
    }
}

async fn show(config: &Config) -> anyhow::Result<()> {
    let resolver = resolver_from_config(config)?;
    let fetcher = fetcher_from_config(config)?;

    let now = Utc::now();
    let report =
        pipeline::run(resolver.as_ref(), fetcher.as_ref(), &config.fetch_options(), now).await;

    print!("{}", render::render_report(&report, now.with_timezone(&Local)));
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current = config.location_strategy().unwrap_or(LocationStrategy::Ip);
    let start = LocationStrategy::all().iter().position(|s| *s == current).unwrap_or(0);
    let strategy = Select::new("How should your location be found?", LocationStrategy::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Location strategy prompt aborted")?;
    config.set_location_strategy(strategy);

    if strategy != LocationStrategy::Ip {
        let pin = Confirm::new("Pin a device position?")
            .with_default(config.device_position().is_some())
            .with_help_message("Without a pinned position the device strategy has nothing to report")
            .prompt()
            .context("Device position prompt aborted")?;

        if pin {
            let latitude = CustomType::<f64>::new("Latitude:")
                .with_error_message("Please enter a decimal number")
                .prompt()
                .context("Latitude prompt aborted")?;
            let longitude = CustomType::<f64>::new("Longitude:")
                .with_error_message("Please enter a decimal number")
                .prompt()
                .context("Longitude prompt aborted")?;
            config.set_device_position(latitude, longitude)?;
        } else {
            config.clear_device_position();
        }
    }

    let max_age = CustomType::<u64>::new("Reuse forecasts younger than (seconds, 0 = never):")
        .with_default(config.forecast.max_age_secs)
        .prompt()
        .context("Cache age prompt aborted")?;
    config.forecast.max_age_secs = max_age;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
