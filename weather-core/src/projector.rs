//! Decoding of the positional forecast response into tables.
//!
//! Every function here is pure. The variable list passed in must be the one
//! the request was built from: slot `i` is decoded as variable `i`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    error::{Result, WeatherError},
    forecast::{ForecastResponse, RawSeries, RawVariable},
    model::{Column, CurrentSnapshot, INSTANT_VARIABLES, LocationInfo, TimeSeriesTable},
};

/// All four slices of one response. Produced together or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub location: LocationInfo,
    pub current: CurrentSnapshot,
    pub hourly: TimeSeriesTable,
    pub daily: TimeSeriesTable,
}

impl ForecastResponse {
    /// Project every slice using the request's own variable lists.
    pub fn project(&self) -> Result<Projection> {
        Ok(Projection {
            location: project_location(self),
            current: project_current(self, &self.request.current)?,
            hourly: project_hourly(self, &self.request.hourly)?,
            daily: project_daily(self, &self.request.daily)?,
        })
    }
}

pub fn project_location(response: &ForecastResponse) -> LocationInfo {
    LocationInfo {
        latitude: response.latitude,
        longitude: response.longitude,
        elevation_meters: response.elevation,
        timezone: response.timezone.to_text(),
        timezone_abbreviation: response.timezone_abbreviation.to_text(),
    }
}

pub fn project_current<S: AsRef<str>>(
    response: &ForecastResponse,
    vars: &[S],
) -> Result<CurrentSnapshot> {
    let current = &response.current;
    check_slots("current", current.variables.len(), vars.len())?;

    let time = instant(current.time)?;
    let values = vars
        .iter()
        .zip(&current.variables)
        .map(|(name, value)| -> Result<(String, f32)> {
            let name = name.as_ref();
            Ok((name.to_string(), decode_f32(value, name)?))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CurrentSnapshot { time, values })
}

pub fn project_hourly<S: AsRef<str>>(
    response: &ForecastResponse,
    vars: &[S],
) -> Result<TimeSeriesTable> {
    project_series("hourly", &response.hourly, vars, |_| false)
}

/// Like [`project_hourly`], except sunrise/sunset are decoded as integer
/// epoch seconds into instants.
pub fn project_daily<S: AsRef<str>>(
    response: &ForecastResponse,
    vars: &[S],
) -> Result<TimeSeriesTable> {
    project_series("daily", &response.daily, vars, |name| {
        INSTANT_VARIABLES.contains(&name)
    })
}

/// Row instants for `[start, end)` stepping by `interval` seconds.
pub fn timeline(start: i64, end: i64, interval: i64) -> Result<Vec<DateTime<Utc>>> {
    if end <= start {
        return Ok(Vec::new());
    }
    if interval <= 0 {
        return Err(WeatherError::projection(format!(
            "non-positive series interval {interval}"
        )));
    }

    let rows = (end - start + interval - 1) / interval;
    (0..rows).map(|i| instant(start + i * interval)).collect()
}

fn project_series<S: AsRef<str>>(
    label: &str,
    series: &RawSeries,
    vars: &[S],
    is_instant: impl Fn(&str) -> bool,
) -> Result<TimeSeriesTable> {
    check_slots(label, series.variables.len(), vars.len())?;

    let dates = timeline(series.time, series.time_end, series.interval)?;

    let columns = vars
        .iter()
        .zip(&series.variables)
        .map(|(name, raw)| -> Result<(String, Column)> {
            let name = name.as_ref();
            let column = if is_instant(name) {
                Column::Instant(decode_instants(raw, name)?)
            } else {
                Column::Float(decode_floats(raw, name)?)
            };

            if column.len() != dates.len() {
                return Err(WeatherError::projection(format!(
                    "{label} variable '{name}' has {} values for {} rows",
                    column.len(),
                    dates.len()
                )));
            }
            Ok((name.to_string(), column))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TimeSeriesTable { dates, columns })
}

fn check_slots(label: &str, slots: usize, requested: usize) -> Result<()> {
    if slots < requested {
        return Err(WeatherError::projection(format!(
            "{label} response has {slots} value slots for {requested} requested variables"
        )));
    }
    Ok(())
}

fn instant(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| WeatherError::projection(format!("timestamp {secs} out of range")))
}

// The API publishes single-precision floats; null means "no value".
fn decode_f32(value: &Value, name: &str) -> Result<f32> {
    match value {
        Value::Null => Ok(f32::NAN),
        Value::Number(n) => n
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| WeatherError::projection(format!("'{name}' is not a float"))),
        other => Err(WeatherError::projection(format!(
            "'{name}' has non-numeric value {other}"
        ))),
    }
}

pub(crate) fn decode_floats(raw: &RawVariable, name: &str) -> Result<Vec<f32>> {
    raw.values.iter().map(|v| decode_f32(v, name)).collect()
}

fn decode_instants(raw: &RawVariable, name: &str) -> Result<Vec<Option<DateTime<Utc>>>> {
    raw.values
        .iter()
        .map(|v| match v {
            Value::Null => Ok(None),
            other => {
                let secs = other.as_i64().ok_or_else(|| {
                    WeatherError::projection(format!("'{name}' is not integer epoch seconds"))
                })?;
                instant(secs).map(Some)
            }
        })
        .collect()
}
