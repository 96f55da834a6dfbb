//! Forecast models returned by the weather endpoint

use serde::Serialize;

/// One forecast time slot
///
/// Value fields are always strings; a quantity the upstream did not report
/// for this slot stays empty.
#[derive(Debug, Default, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastWindow {
    /// Slot start, ISO timestamp as delivered upstream
    pub start_time: String,
    /// Slot end, ISO timestamp as delivered upstream
    pub end_time: String,
    /// Condition text (`Wx`)
    pub weather: String,
    /// Precipitation probability with `%` suffix (`PoP`)
    pub rain: String,
    /// Minimum temperature with `°C` suffix (`MinT`)
    pub min_temp: String,
    /// Maximum temperature with `°C` suffix (`MaxT`)
    pub max_temp: String,
    /// Comfort index text (`CI`)
    pub comfort: String,
    /// Wind speed text (`WS`)
    pub wind_speed: String,
}

impl ForecastWindow {
    /// Create an empty window for the given time bounds
    #[must_use]
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            ..Self::default()
        }
    }
}

/// Flattened forecast for one location
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResult {
    /// Location name as resolved by the upstream
    pub city: String,
    /// Upstream dataset description
    pub update_time: String,
    /// Windows in upstream time-slot order
    pub forecasts: Vec<ForecastWindow>,
}
