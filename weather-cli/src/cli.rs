use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Text};
use weather_core::{Config, WeatherService};

use crate::render::{self, RenderOptions};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard for any city")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store default city, forecast horizon and cache settings.
    Configure,

    /// Show the dashboard for a city.
    Show {
        /// City name; defaults to the configured city.
        city: Option<String>,

        /// Also print the full hourly and daily tables.
        #[arg(long)]
        raw: bool,
    },

    /// Prompt for cities until cancelled (Esc / Ctrl-C).
    Interactive {
        #[arg(long)]
        raw: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, raw } => {
                let config = Config::load()?;
                let city = city.unwrap_or_else(|| config.default_city.clone());
                let service = WeatherService::from_config(&config)?;

                let page = show(&service, &config, &city, raw).await?;
                println!("{page}");
                Ok(())
            }
            Command::Interactive { raw } => interactive(raw).await,
        }
    }
}

async fn show(
    service: &WeatherService,
    config: &Config,
    city: &str,
    raw: bool,
) -> anyhow::Result<String> {
    let city = city.trim();
    if city.is_empty() {
        return Err(anyhow!("Please enter a city name."));
    }

    eprintln!("Locating '{city}'...");
    let dashboard = service.load(city).await?;
    tracing::debug!(
        "Loaded {} hourly and {} daily rows for {}",
        dashboard.hourly.len(),
        dashboard.daily.len(),
        dashboard.location.display_name
    );

    let options = RenderOptions {
        hours_ahead: config.hours_ahead,
        outlook_days: config.outlook_days,
        raw,
    };
    render::dashboard(&dashboard, Utc::now(), &options)
}

async fn interactive(raw: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let service = WeatherService::from_config(&config)?;

    loop {
        let input = Text::new("Enter City Name")
            .with_default(&config.default_city)
            .prompt();

        let city = match input {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        // Errors are shown and the prompt comes back, the session keeps going.
        match show(&service, &config, &city, raw).await {
            Ok(page) => println!("{page}"),
            Err(e) => {
                tracing::debug!("Render failed: {e:?}");
                eprintln!("{e}");
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.default_city = Text::new("Default city")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?
        .trim()
        .to_string();

    config.hours_ahead = CustomType::<usize>::new("Hours ahead to show")
        .with_default(config.hours_ahead)
        .with_error_message("Please type a whole number")
        .prompt()
        .context("Failed to read hours ahead")?;

    config.cache.enabled = Confirm::new("Cache API responses?")
        .with_default(config.cache.enabled)
        .prompt()
        .context("Failed to read cache choice")?;

    if config.cache.enabled {
        config.cache.ttl_secs = CustomType::<u64>::new("Cache lifetime in seconds")
            .with_default(config.cache.ttl_secs)
            .with_error_message("Please type a whole number")
            .prompt()
            .context("Failed to read cache lifetime")?;
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
