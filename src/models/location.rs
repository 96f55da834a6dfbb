//! Reverse geocoding result model

use serde::Serialize;

/// Administrative-area name resolved from a coordinate pair
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct GeocodeResult {
    /// Canonical county/city name
    pub city: String,
}

impl GeocodeResult {
    #[must_use]
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into() }
    }
}
