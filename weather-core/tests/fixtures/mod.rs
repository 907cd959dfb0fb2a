//! Shared Open-Meteo payloads for the integration tests.

#![allow(dead_code)]

use serde_json::{Map, Value, json};
use weather_core::model::{CURRENT_VARIABLES, DAILY_VARIABLES, HOURLY_VARIABLES};

/// 2025-06-01T00:00:00+05:30
pub const DAY0: i64 = 1_748_716_200;

pub fn amritsar_search() -> Value {
    json!({
        "results": [{
            "id": 1278710,
            "name": "Amritsar",
            "latitude": 31.62234,
            "longitude": 74.87534,
            "elevation": 234.0,
            "country_code": "IN",
            "timezone": "Asia/Kolkata",
            "country": "India",
            "admin1": "Punjab"
        }],
        "generationtime_ms": 0.61
    })
}

pub fn empty_search() -> Value {
    json!({ "generationtime_ms": 0.42 })
}

/// A forecast body with `hours` hourly rows and `days` daily rows.
pub fn forecast_body(hours: i64, days: i64) -> Value {
    let mut current = Map::new();
    current.insert("time".into(), json!(DAY0 + 14 * 3600));
    current.insert("interval".into(), json!(900));
    for (i, var) in CURRENT_VARIABLES.iter().enumerate() {
        let value = match *var {
            "weather_code" => json!(2),
            "is_day" => json!(1),
            _ => json!(10.0 + i as f64),
        };
        current.insert(var.to_string(), value);
    }

    let mut hourly = Map::new();
    hourly.insert(
        "time".into(),
        json!((0..hours).map(|h| DAY0 + h * 3600).collect::<Vec<_>>()),
    );
    for (i, var) in HOURLY_VARIABLES.iter().enumerate() {
        let values: Vec<Value> = (0..hours).map(|h| json!(i as f64 + h as f64)).collect();
        hourly.insert(var.to_string(), Value::Array(values));
    }

    let mut daily = Map::new();
    daily.insert(
        "time".into(),
        json!((0..days).map(|d| DAY0 + d * 86_400).collect::<Vec<_>>()),
    );
    for var in DAILY_VARIABLES {
        let values: Vec<Value> = (0..days)
            .map(|d| match *var {
                "sunrise" => json!(DAY0 + d * 86_400 + 5 * 3600 + 37 * 60),
                "sunset" => json!(DAY0 + d * 86_400 + 19 * 3600 + 31 * 60),
                "weather_code" => json!(80),
                "uv_index_max" => json!(9.85),
                _ => json!(30.0 + d as f64),
            })
            .collect();
        daily.insert(var.to_string(), Value::Array(values));
    }

    json!({
        "latitude": 31.625,
        "longitude": 74.875,
        "generationtime_ms": 1.2,
        "utc_offset_seconds": 19800,
        "timezone": "Asia/Kolkata",
        "timezone_abbreviation": "GMT+5:30",
        "elevation": 234.0,
        "current": current,
        "hourly": hourly,
        "daily": daily,
    })
}
