//! Data models for the weather proxy
//!
//! This module contains the response models organized by concern:
//! - Forecast: flattened forecast windows per location
//! - Location: reverse geocoding results

pub mod forecast;
pub mod location;

// Re-export all public types for convenient access
pub use forecast::{ForecastWindow, WeatherResult};
pub use location::GeocodeResult;
