//! Forward geocoding: city name to coordinates and timezone.
//! Uses the Open-Meteo geocoding API - free, no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    cache::{Cache, NoopCache},
    error::{Result, WeatherError},
    model::Location,
    provider::LocationResolver,
};

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    admin1: Option<String>,
    #[serde(default)]
    country: Option<String>,
    latitude: f64,
    longitude: f64,
    timezone: String,
}

impl From<GeoResult> for Location {
    fn from(r: GeoResult) -> Self {
        let display_name = display_name(&[
            r.name.as_deref(),
            r.admin1.as_deref(),
            r.country.as_deref(),
        ]);

        Location {
            latitude: r.latitude,
            longitude: r.longitude,
            display_name,
            timezone: r.timezone,
        }
    }
}

/// Join the non-empty parts with ", ".
pub fn display_name(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolves city names, taking the first match only.
///
/// Hits and misses are cached per exact input; transport errors are not.
#[derive(Debug, Clone)]
pub struct Geocoder {
    http: Client,
    base_url: String,
    cache: Arc<dyn Cache<Option<Location>>>,
}

impl Geocoder {
    pub fn new(http: Client, base_url: impl Into<String>, cache: Arc<dyn Cache<Option<Location>>>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            cache,
        }
    }

    /// Uncached geocoder against the public endpoint.
    pub fn open_meteo() -> Self {
        Self::new(Client::new(), GEOCODING_URL, Arc::new(NoopCache))
    }

    pub async fn resolve(&self, city: &str) -> Result<Location> {
        if let Some(cached) = self.cache.get(city) {
            tracing::debug!("Geocode cache hit for '{}'", city);
            return cached.ok_or_else(|| WeatherError::NotFound(city.to_string()));
        }

        let found = self.lookup(city).await?;
        self.cache.put(city.to_string(), found.clone());

        match found {
            Some(location) => {
                tracing::info!(
                    "Geocoded '{}' to {} ({}, {})",
                    city,
                    location.display_name,
                    location.latitude,
                    location.longitude
                );
                Ok(location)
            }
            None => Err(WeatherError::NotFound(city.to_string())),
        }
    }

    async fn lookup(&self, city: &str) -> Result<Option<Location>> {
        tracing::debug!("Geocoding '{}' via {}", city, self.base_url);

        let res = self
            .http
            .get(&self.base_url)
            .query(&[("name", city), ("count", "1"), ("format", "json")])
            .send()
            .await
            .map_err(|e| WeatherError::Geocoding(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(WeatherError::Geocoding(format!(
                "request failed with status {status}"
            )));
        }

        let body: GeoResponse = res
            .json()
            .await
            .map_err(|e| WeatherError::Geocoding(format!("failed to parse response: {e}")))?;

        Ok(body
            .results
            .and_then(|results| results.into_iter().next())
            .map(Location::from))
    }
}

#[async_trait]
impl LocationResolver for Geocoder {
    async fn resolve(&self, city: &str) -> Result<Location> {
        Geocoder::resolve(self, city).await
    }
}
