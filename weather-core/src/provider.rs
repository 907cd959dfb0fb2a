use async_trait::async_trait;
use chrono::Duration as TimeDelta;
use chrono_tz::Tz;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

use crate::{
    Config,
    cache::cache_for,
    error::Result,
    forecast::{ForecastClient, ForecastResponse},
    geocode::Geocoder,
    model::{CurrentSnapshot, Location, LocationInfo, TimeSeriesTable},
    retry::RetryConfig,
};

#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    async fn resolve(&self, city: &str) -> Result<Location>;
}

#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, location: &Location) -> Result<ForecastResponse>;
}

/// Everything one dashboard render needs, from a single fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub location: Location,
    pub info: LocationInfo,
    pub current: CurrentSnapshot,
    pub hourly: TimeSeriesTable,
    pub daily: TimeSeriesTable,
}

impl Dashboard {
    /// Zone used for every local-time field.
    pub fn tz(&self) -> Result<Tz> {
        self.location.tz()
    }
}

/// Geocode, fetch and project, one step after the other.
#[derive(Debug)]
pub struct WeatherService {
    resolver: Box<dyn LocationResolver>,
    source: Box<dyn ForecastSource>,
}

impl WeatherService {
    pub fn new(resolver: Box<dyn LocationResolver>, source: Box<dyn ForecastSource>) -> Self {
        Self { resolver, source }
    }

    /// Wire the Open-Meteo clients using `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .user_agent(concat!("weather-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let ttl = i64::try_from(config.cache.ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| {
                anyhow::anyhow!("cache.ttl_secs = {} is out of range", config.cache.ttl_secs)
            })?;
        let geocoder = Geocoder::new(
            http.clone(),
            config.api.geocoding_url.clone(),
            cache_for(config.cache.enabled, ttl),
        );
        let forecast = ForecastClient::new(
            http,
            config.api.forecast_url.clone(),
            RetryConfig::new(
                config.retry.max_retries,
                config.retry.initial_delay_ms,
                config.retry.max_delay_ms,
            ),
            cache_for(config.cache.enabled, ttl),
        );

        Ok(Self::new(Box::new(geocoder), Box::new(forecast)))
    }

    /// `city` must already be trimmed and non-empty.
    pub async fn load(&self, city: &str) -> Result<Dashboard> {
        let location = self.resolver.resolve(city).await?;
        let response = self.source.fetch(&location).await?;
        let projection = response.project()?;

        Ok(Dashboard {
            location,
            info: projection.location,
            current: projection.current,
            hourly: projection.hourly,
            daily: projection.daily,
        })
    }
}
