//! Taiwan weather proxy
//!
//! Forwards requests to the CWA weather datastore and a reverse geocoding
//! service, reshaping their loosely structured responses into a small,
//! stable JSON contract.

pub mod api;
pub mod city_names;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod models;
pub mod upstream;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use city_names::normalize_city_name;
pub use config::ProxyConfig;
pub use error::ProxyError;
pub use location_resolver::{AddressOrder, LocationResolver};
pub use models::{ForecastWindow, GeocodeResult, WeatherResult};
pub use weather::WeatherService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent sent to upstream services
pub const USER_AGENT: &str = concat!("taiwan-weather-proxy/", env!("CARGO_PKG_VERSION"));

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ProxyError>;
