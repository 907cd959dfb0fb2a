//! Render-ready rows derived from projected tables.
//!
//! Local-time strings always come from converting UTC instants into the
//! location's zone.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::{
    codes::{WeatherDescription, describe_value},
    model::{CurrentSnapshot, LocationInfo, TimeSeriesTable},
};

pub const DEFAULT_HOURS_AHEAD: usize = 8;
pub const OUTLOOK_DAYS: usize = 7;

/// (variable, display label) pairs for the hourly trend chart.
pub const HOURLY_TREND: &[(&str, &str)] = &[
    ("temperature_2m", "Temp (°C)"),
    ("apparent_temperature", "Feels Like (°C)"),
    ("precipitation_probability", "Precip. Prob. (%)"),
    ("wind_speed_10m", "Wind (km/h)"),
];

pub const SOIL_TEMPERATURE: &[(&str, &str)] = &[
    ("soil_temperature_0cm", "0cm"),
    ("soil_temperature_6cm", "6cm"),
    ("soil_temperature_18cm", "18cm"),
    ("soil_temperature_54cm", "54cm"),
];

pub const SOIL_MOISTURE: &[(&str, &str)] = &[
    ("soil_moisture_0_to_1cm", "0-1cm"),
    ("soil_moisture_1_to_3cm", "1-3cm"),
    ("soil_moisture_3_to_9cm", "3-9cm"),
    ("soil_moisture_9_to_27cm", "9-27cm"),
    ("soil_moisture_27_to_81cm", "27-81cm"),
];

pub const DAILY_TEMPERATURE: &[(&str, &str)] = &[
    ("temperature_2m_max", "Max (°C)"),
    ("temperature_2m_min", "Min (°C)"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    /// e.g. "Sunday, June 01, 12:10 AM"
    pub local_time: String,
    pub weather: WeatherDescription,
    pub temperature: f32,
    pub feels_like: f32,
    pub humidity: f32,
    pub wind_speed: f32,
    pub wind_gusts: f32,
    /// Today's daily maximum, not the instantaneous reading.
    pub uv_index: Option<f32>,
    pub is_day: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourCard {
    pub time_local: DateTime<Tz>,
    /// 12-hour clock, e.g. "03 PM".
    pub label: String,
    pub weather: WeatherDescription,
    pub temperature: f32,
    pub wind_speed: f32,
    pub precipitation_probability: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCard {
    /// Row start. Days after a DST change start an hour off local midnight,
    /// so the names below are taken from the middle of the row.
    pub date_local: DateTime<Tz>,
    pub day_name: String,
    /// e.g. "Jun 01"
    pub date_str: String,
    pub weather: WeatherDescription,
    pub temperature_max: f32,
    pub temperature_min: f32,
    pub precipitation_probability_max: f32,
    pub wind_speed_max: f32,
    pub sunrise_local: Option<DateTime<Tz>>,
    pub sunset_local: Option<DateTime<Tz>>,
}

/// Named series over a shared local timeline, ready for a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledSeries {
    pub dates: Vec<DateTime<Tz>>,
    pub series: Vec<(String, Vec<f32>)>,
}

/// Rows at or after `now`, at most `n` of them. Never pads.
pub fn next_hours(hourly: &TimeSeriesTable, now: DateTime<Tz>, n: usize) -> TimeSeriesTable {
    let now = now.with_timezone(&Utc);
    let start = hourly.dates.partition_point(|d| *d < now);
    hourly.slice(start, n)
}

pub fn hour_cards(rows: &TimeSeriesTable, tz: Tz) -> Vec<HourCard> {
    rows.dates
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let time_local = date.with_timezone(&tz);
            HourCard {
                label: time_local.format("%I %p").to_string(),
                time_local,
                weather: describe_value(rows.value(i, "weather_code")),
                temperature: rows.value(i, "temperature_2m"),
                wind_speed: rows.value(i, "wind_speed_10m"),
                precipitation_probability: rows.value(i, "precipitation_probability"),
            }
        })
        .collect()
}

pub fn seven_day_outlook(daily: &TimeSeriesTable, tz: Tz) -> Vec<DayCard> {
    outlook(daily, tz, OUTLOOK_DAYS)
}

pub fn outlook(daily: &TimeSeriesTable, tz: Tz, days: usize) -> Vec<DayCard> {
    let head = daily.head(days);
    let local = |at: Option<&Option<DateTime<Utc>>>| {
        at.copied().flatten().map(|at| at.with_timezone(&tz))
    };

    head.dates
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let date_local = date.with_timezone(&tz);
            let midday = (*date + Duration::hours(12)).with_timezone(&tz);
            DayCard {
                day_name: midday.format("%A").to_string(),
                date_str: midday.format("%b %d").to_string(),
                date_local,
                weather: describe_value(head.value(i, "weather_code")),
                temperature_max: head.value(i, "temperature_2m_max"),
                temperature_min: head.value(i, "temperature_2m_min"),
                precipitation_probability_max: head.value(i, "precipitation_probability_max"),
                wind_speed_max: head.value(i, "wind_speed_10m_max"),
                sunrise_local: local(head.instants("sunrise").and_then(|c| c.get(i))),
                sunset_local: local(head.instants("sunset").and_then(|c| c.get(i))),
            }
        })
        .collect()
}

pub fn today_uv_max(daily: &TimeSeriesTable) -> Option<f32> {
    daily
        .floats("uv_index_max")
        .and_then(|v| v.first().copied())
        .filter(|v| !v.is_nan())
}

pub fn current_conditions(
    current: &CurrentSnapshot,
    daily: &TimeSeriesTable,
    tz: Tz,
) -> CurrentConditions {
    let get = |name| current.get(name).unwrap_or(f32::NAN);

    CurrentConditions {
        local_time: current
            .time
            .with_timezone(&tz)
            .format("%A, %B %d, %I:%M %p")
            .to_string(),
        weather: describe_value(get("weather_code")),
        temperature: get("temperature_2m"),
        feels_like: get("apparent_temperature"),
        humidity: get("relative_humidity_2m"),
        wind_speed: get("wind_speed_10m"),
        wind_gusts: get("wind_gusts_10m"),
        uv_index: today_uv_max(daily),
        is_day: get("is_day") >= 0.5,
    }
}

pub fn location_caption(info: &LocationInfo) -> String {
    format!(
        "Coordinates: {:.4}°N, {:.4}°E | Elevation: {}m | Timezone: {} ({})",
        info.latitude,
        info.longitude,
        info.elevation_meters,
        info.timezone,
        info.timezone_abbreviation
    )
}

/// Pick `columns` out of `table` under their display labels.
///
/// Variables missing from the table are skipped.
pub fn labelled_series(table: &TimeSeriesTable, tz: Tz, columns: &[(&str, &str)]) -> LabelledSeries {
    LabelledSeries {
        dates: table.dates.iter().map(|d| d.with_timezone(&tz)).collect(),
        series: columns
            .iter()
            .filter_map(|(var, label)| table.floats(var).map(|v| (label.to_string(), v.to_vec())))
            .collect(),
    }
}
