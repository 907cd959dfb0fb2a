use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::{Result, WeatherError};

pub const DAILY_VARIABLES: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "sunset",
    "sunrise",
    "precipitation_sum",
    "precipitation_probability_max",
    "wind_speed_10m_max",
    "uv_index_max",
];

pub const HOURLY_VARIABLES: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "weather_code",
    "pressure_msl",
    "surface_pressure",
    "dew_point_2m",
    "precipitation",
    "precipitation_probability",
    "cloud_cover",
    "visibility",
    "wind_speed_10m",
    "wind_gusts_10m",
    "apparent_temperature",
    "soil_temperature_0cm",
    "soil_temperature_6cm",
    "soil_temperature_18cm",
    "soil_temperature_54cm",
    "soil_moisture_0_to_1cm",
    "soil_moisture_1_to_3cm",
    "soil_moisture_3_to_9cm",
    "soil_moisture_9_to_27cm",
    "soil_moisture_27_to_81cm",
];

pub const CURRENT_VARIABLES: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "is_day",
    "precipitation",
    "weather_code",
    "cloud_cover",
    "wind_speed_10m",
    "wind_gusts_10m",
    "uv_index",
];

/// Daily variables shipped as integer epoch seconds rather than floats.
pub const INSTANT_VARIABLES: &[&str] = &["sunrise", "sunset"];

/// A geocoded place.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    /// IANA zone name, e.g. "Asia/Kolkata".
    pub timezone: String,
}

impl Location {
    pub fn tz(&self) -> Result<Tz> {
        parse_tz(&self.timezone)
    }
}

pub(crate) fn parse_tz(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| WeatherError::projection(format!("unknown timezone '{name}'")))
}

/// Parameters of one forecast call.
///
/// The variable lists double as the decoding schema for the response: the
/// i-th value slot of a series belongs to the i-th name here.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub daily: Vec<String>,
    pub hourly: Vec<String>,
    pub current: Vec<String>,
}

impl ForecastRequest {
    pub fn for_location(location: &Location) -> Self {
        let owned = |vars: &[&str]| vars.iter().map(|v| v.to_string()).collect();

        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            timezone: "auto".to_string(),
            daily: owned(DAILY_VARIABLES),
            hourly: owned(HOURLY_VARIABLES),
            current: owned(CURRENT_VARIABLES),
        }
    }

    /// Query pairs in a stable order, so equal requests produce equal URLs.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("timezone", self.timezone.clone()),
            ("timeformat", "unixtime".to_string()),
            ("daily", self.daily.join(",")),
            ("hourly", self.hourly.join(",")),
            ("current", self.current.join(",")),
        ]
    }
}

/// Location metadata echoed back by the forecast API.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_meters: f64,
    pub timezone: String,
    pub timezone_abbreviation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSnapshot {
    pub time: DateTime<Utc>,
    /// In request order.
    pub values: Vec<(String, f32)>,
}

impl CurrentSnapshot {
    pub fn get(&self, variable: &str) -> Option<f32> {
        self.values
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, v)| *v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<f32>),
    /// `None` where the API had no value (e.g. no sunrise during polar night).
    Instant(Vec<Option<DateTime<Utc>>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Instant(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A time-indexed table: one `dates` entry per row and one column per
/// requested variable, every column as long as `dates`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    pub dates: Vec<DateTime<Utc>>,
    pub columns: Vec<(String, Column)>,
}

impl TimeSeriesTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, variable: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, c)| c)
    }

    pub fn floats(&self, variable: &str) -> Option<&[f32]> {
        match self.column(variable)? {
            Column::Float(v) => Some(v),
            Column::Instant(_) => None,
        }
    }

    pub fn instants(&self, variable: &str) -> Option<&[Option<DateTime<Utc>>]> {
        match self.column(variable)? {
            Column::Instant(v) => Some(v),
            Column::Float(_) => None,
        }
    }

    /// Float value at `row`; NaN when the variable is absent or not float-valued.
    pub fn value(&self, row: usize, variable: &str) -> f32 {
        self.floats(variable)
            .and_then(|v| v.get(row).copied())
            .unwrap_or(f32::NAN)
    }

    pub fn head(&self, n: usize) -> TimeSeriesTable {
        self.slice(0, n)
    }

    pub(crate) fn slice(&self, start: usize, n: usize) -> TimeSeriesTable {
        let start = start.min(self.len());
        let end = start.saturating_add(n).min(self.len());

        let columns = self
            .columns
            .iter()
            .map(|(name, col)| {
                let col = match col {
                    Column::Float(v) => Column::Float(v[start..end].to_vec()),
                    Column::Instant(v) => Column::Instant(v[start..end].to_vec()),
                };
                (name.clone(), col)
            })
            .collect();

        TimeSeriesTable {
            dates: self.dates[start..end].to_vec(),
            columns,
        }
    }
}
