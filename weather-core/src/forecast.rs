//! Forecast fetching against the Open-Meteo forecast API.
//!
//! The client turns the name-keyed JSON body into a [`ForecastResponse`]
//! whose series hold value slots in request order. Decoding those slots is
//! the projector's job.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::{
    cache::{Cache, NoopCache},
    error::{Result, WeatherError},
    model::{ForecastRequest, Location},
    provider::ForecastSource,
    retry::{RetryConfig, with_retry},
};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const HOURLY_INTERVAL_SECS: i64 = 3600;
const DAILY_INTERVAL_SECS: i64 = 86_400;

/// A text field that some transports deliver as raw UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawText {
    Text(String),
    Bytes(Vec<u8>),
}

impl RawText {
    pub fn to_text(&self) -> String {
        match self {
            RawText::Text(s) => s.clone(),
            RawText::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }
}

impl Default for RawText {
    fn default() -> Self {
        RawText::Text(String::new())
    }
}

/// Values of one variable, in timeline order, as they came off the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVariable {
    pub values: Vec<Value>,
}

/// One series block: the timeline triple plus positional value slots.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    /// Epoch seconds of the first row.
    pub time: i64,
    /// Exclusive end, epoch seconds.
    pub time_end: i64,
    pub interval: i64,
    pub variables: Vec<RawVariable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawCurrent {
    pub time: i64,
    pub variables: Vec<Value>,
}

/// Positional forecast response, paired with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResponse {
    pub request: ForecastRequest,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub timezone: RawText,
    pub timezone_abbreviation: RawText,
    pub current: RawCurrent,
    pub hourly: RawSeries,
    pub daily: RawSeries,
}

#[derive(Debug, Deserialize)]
struct WireForecast {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    elevation: f64,
    #[serde(default)]
    timezone: RawText,
    #[serde(default)]
    timezone_abbreviation: RawText,
    #[serde(default)]
    current: Map<String, Value>,
    #[serde(default)]
    hourly: Map<String, Value>,
    #[serde(default)]
    daily: Map<String, Value>,
}

impl ForecastResponse {
    /// Parse a JSON body, laying variables out in the order of `request`.
    pub fn from_json(body: &str, request: ForecastRequest) -> Result<Self> {
        let wire: WireForecast = serde_json::from_str(body)
            .map_err(|e| WeatherError::projection(format!("invalid JSON: {e}")))?;

        let current = positional_current(wire.current, &request.current)?;
        let hourly = positional_series(wire.hourly, &request.hourly, HOURLY_INTERVAL_SECS)?;
        let daily = positional_series(wire.daily, &request.daily, DAILY_INTERVAL_SECS)?;

        Ok(Self {
            request,
            latitude: wire.latitude,
            longitude: wire.longitude,
            elevation: wire.elevation,
            timezone: wire.timezone,
            timezone_abbreviation: wire.timezone_abbreviation,
            current,
            hourly,
            daily,
        })
    }
}

fn epoch_secs(value: &Value, what: &str) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| WeatherError::projection(format!("{what} is not an epoch timestamp")))
}

// Slots stop at the first variable missing from the body so that later
// variables never shift into an earlier position.
fn positional_current(mut block: Map<String, Value>, vars: &[String]) -> Result<RawCurrent> {
    let time = match block.get("time") {
        Some(t) => epoch_secs(t, "current.time")?,
        None => 0,
    };

    let variables = vars.iter().map_while(|name| block.remove(name)).collect();
    Ok(RawCurrent { time, variables })
}

// The cadence is fixed per series. Local midnights around a DST change are
// 23 or 25 hours apart, so gaps in `time` are not used as the interval.
fn positional_series(
    mut block: Map<String, Value>,
    vars: &[String],
    interval: i64,
) -> Result<RawSeries> {
    let times = match block.remove("time") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|t| epoch_secs(t, "series time"))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(WeatherError::projection("series time is not an array")),
        None => Vec::new(),
    };

    let time = times.first().copied().unwrap_or(0);
    let time_end = time + times.len() as i64 * interval;

    let variables = vars
        .iter()
        .map_while(|name| match block.remove(name) {
            Some(Value::Array(values)) => Some(RawVariable { values }),
            _ => None,
        })
        .collect();

    Ok(RawSeries {
        time,
        time_end,
        interval,
        variables,
    })
}

/// Fetches forecasts with response caching and bounded retry.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: Client,
    base_url: String,
    retry: RetryConfig,
    cache: Arc<dyn Cache<String>>,
}

impl ForecastClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        retry: RetryConfig,
        cache: Arc<dyn Cache<String>>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            retry,
            cache,
        }
    }

    pub fn open_meteo() -> Self {
        Self::new(
            Client::new(),
            FORECAST_URL,
            RetryConfig::default(),
            Arc::new(NoopCache),
        )
    }

    /// Full request URL; doubles as the cache key.
    pub fn request_url(&self, request: &ForecastRequest) -> Result<Url> {
        Url::parse_with_params(&self.base_url, request.query_pairs())
            .map_err(|e| WeatherError::Fetch(format!("invalid forecast URL '{}': {e}", self.base_url)))
    }

    pub async fn fetch(&self, location: &Location) -> Result<ForecastResponse> {
        let request = ForecastRequest::for_location(location);
        let url = self.request_url(&request)?;

        if let Some(body) = self.cache.get(url.as_str()) {
            tracing::debug!("Forecast cache hit for {}", url);
            return ForecastResponse::from_json(&body, request);
        }

        // Only bodies that parse are cached, so a resubmit refetches a bad one.
        let body = self.download(&url).await?;
        let response = ForecastResponse::from_json(&body, request)?;
        self.cache.put(url.to_string(), body);

        Ok(response)
    }

    async fn download(&self, url: &Url) -> Result<String> {
        tracing::debug!("Fetching forecast: {}", url);

        let res = with_retry(&self.retry, || self.http.get(url.clone()).send())
            .await
            .map_err(|e| WeatherError::Fetch(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::Fetch(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(WeatherError::Fetch(format!(
                "request failed with status {}: {}",
                status,
                truncate_body(&body)
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl ForecastSource for ForecastClient {
    async fn fetch(&self, location: &Location) -> Result<ForecastResponse> {
        ForecastClient::fetch(self, location).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
