//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Geocoding of city names and forecast fetching (Open-Meteo)
//! - Positional decoding of the forecast response into tables
//! - Render-ready derivations (hour cards, day outlook, current conditions)
//! - Configuration, caching and retry plumbing
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod cache;
pub mod codes;
pub mod config;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod model;
pub mod presenter;
pub mod projector;
pub mod provider;
pub mod retry;

pub use codes::{WeatherDescription, describe};
pub use config::Config;
pub use error::WeatherError;
pub use forecast::{ForecastClient, ForecastResponse};
pub use geocode::Geocoder;
pub use model::{CurrentSnapshot, ForecastRequest, Location, LocationInfo, TimeSeriesTable};
pub use provider::{Dashboard, ForecastSource, LocationResolver, WeatherService};
