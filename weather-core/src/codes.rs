//! WMO present-weather codes as used by Open-Meteo.
//!
//! See: https://open-meteo.com/en/docs#weathervariables

/// Text and glyph shown for one weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherDescription {
    pub description: &'static str,
    pub icon: &'static str,
}

impl WeatherDescription {
    const fn new(description: &'static str, icon: &'static str) -> Self {
        Self { description, icon }
    }

    pub fn is_known(&self) -> bool {
        *self != UNKNOWN
    }
}

/// Returned for any code outside [`KNOWN_CODES`].
pub const UNKNOWN: WeatherDescription = WeatherDescription::new("N/A", "❓");

/// Every code [`describe`] recognizes, in ascending order.
pub const KNOWN_CODES: [i32; 28] = [
    0, 1, 2, 3, 45, 48, 51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 71, 73, 75, 77, 80, 81, 82, 85,
    86, 95, 96, 99,
];

pub fn describe(code: i32) -> WeatherDescription {
    match code {
        0 => WeatherDescription::new("Clear sky", "☀️"),
        1 => WeatherDescription::new("Mainly clear", "🌤️"),
        2 => WeatherDescription::new("Partly cloudy", "🌥️"),
        3 => WeatherDescription::new("Overcast", "☁️"),
        45 => WeatherDescription::new("Fog", "🌫️"),
        48 => WeatherDescription::new("Depositing rime fog", "🌫️"),
        51 => WeatherDescription::new("Light drizzle", "💧"),
        53 => WeatherDescription::new("Moderate drizzle", "💧"),
        55 => WeatherDescription::new("Dense drizzle", "💧"),
        56 => WeatherDescription::new("Light freezing drizzle", "🥶"),
        57 => WeatherDescription::new("Dense freezing drizzle", "🥶"),
        61 => WeatherDescription::new("Slight rain", "🌧️"),
        63 => WeatherDescription::new("Moderate rain", "🌧️"),
        65 => WeatherDescription::new("Heavy rain", "🌧️"),
        66 => WeatherDescription::new("Light freezing rain", "🥶"),
        67 => WeatherDescription::new("Heavy freezing rain", "🥶"),
        71 => WeatherDescription::new("Slight snow fall", "🌨️"),
        73 => WeatherDescription::new("Moderate snow fall", "🌨️"),
        75 => WeatherDescription::new("Heavy snow fall", "🌨️"),
        77 => WeatherDescription::new("Snow grains", "🌨️"),
        80 => WeatherDescription::new("Slight rain showers", "🌦️"),
        81 => WeatherDescription::new("Moderate rain showers", "🌦️"),
        82 => WeatherDescription::new("Violent rain showers", "🌦️"),
        85 => WeatherDescription::new("Slight snow showers", "🌨️"),
        86 => WeatherDescription::new("Heavy snow showers", "🌨️"),
        95 => WeatherDescription::new("Thunderstorm", "⛈️"),
        96 => WeatherDescription::new("Thunderstorm, slight hail", "⛈️"),
        99 => WeatherDescription::new("Thunderstorm, heavy hail", "⛈️"),
        _ => UNKNOWN,
    }
}

/// Describe a code decoded from a float column.
///
/// The API ships codes as floats; they are rounded to the nearest integer.
/// NaN (missing value) maps to [`UNKNOWN`] instead of saturating to 0.
pub fn describe_value(value: f32) -> WeatherDescription {
    if !value.is_finite() {
        return UNKNOWN;
    }
    describe(value.round() as i32)
}
