//! CWA open data response structures and conversion utilities

use std::collections::HashMap;

use serde::Deserialize;

use crate::models::{ForecastWindow, WeatherResult};

/// Top-level datastore response
#[derive(Debug, Deserialize)]
pub struct DatasetResponse {
    pub records: Option<Records>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Records {
    #[serde(default)]
    pub dataset_description: String,
    pub location: Option<Vec<LocationRecord>>,
}

/// Forecast series for one location
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub location_name: String,
    #[serde(default)]
    pub weather_element: Vec<WeatherElement>,
}

/// One quantity's time series, tagged by element code
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherElement {
    pub element_name: String,
    #[serde(default)]
    pub time: Vec<TimeSlot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub parameter: Parameter,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(default)]
    pub parameter_name: String,
}

/// Element codes the proxy understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementCode {
    /// `Wx`, condition text
    Weather,
    /// `PoP`, precipitation probability in percent
    Rain,
    /// `MinT`, Celsius
    MinTemp,
    /// `MaxT`, Celsius
    MaxTemp,
    /// `CI`, comfort index text
    Comfort,
    /// `WS`, wind speed text
    WindSpeed,
}

impl ElementCode {
    /// Parse an upstream element name; unknown codes yield `None`
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Wx" => Some(Self::Weather),
            "PoP" => Some(Self::Rain),
            "MinT" => Some(Self::MinTemp),
            "MaxT" => Some(Self::MaxTemp),
            "CI" => Some(Self::Comfort),
            "WS" => Some(Self::WindSpeed),
            _ => None,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Rain => "%",
            Self::MinTemp | Self::MaxTemp => "°C",
            Self::Weather | Self::Comfort | Self::WindSpeed => "",
        }
    }

    /// Write `value` into the matching field of `window`
    pub fn apply(self, window: &mut ForecastWindow, value: &str) {
        let formatted = if value.is_empty() {
            String::new()
        } else {
            format!("{value}{}", self.suffix())
        };

        let field = match self {
            Self::Weather => &mut window.weather,
            Self::Rain => &mut window.rain,
            Self::MinTemp => &mut window.min_temp,
            Self::MaxTemp => &mut window.max_temp,
            Self::Comfort => &mut window.comfort,
            Self::WindSpeed => &mut window.wind_speed,
        };
        *field = formatted;
    }
}

impl LocationRecord {
    /// Flatten the parallel element series into one window per time slot
    ///
    /// The slot count and time bounds come from the first element's series.
    #[must_use]
    pub fn forecast_windows(&self) -> Vec<ForecastWindow> {
        let Some(first) = self.weather_element.first() else {
            return Vec::new();
        };

        // Later series with a repeated code replace earlier ones
        let series: HashMap<ElementCode, &[TimeSlot]> = self
            .weather_element
            .iter()
            .filter_map(|element| {
                ElementCode::from_name(&element.element_name)
                    .map(|code| (code, element.time.as_slice()))
            })
            .collect();

        first
            .time
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                let mut window = ForecastWindow::new(&slot.start_time, &slot.end_time);
                for (code, times) in &series {
                    if let Some(entry) = times.get(i) {
                        code.apply(&mut window, &entry.parameter.parameter_name);
                    }
                }
                window
            })
            .collect()
    }
}

impl WeatherResult {
    /// Build the result from the first matching location
    #[must_use]
    pub fn from_cwa(location: &LocationRecord, dataset_description: &str) -> Self {
        Self {
            city: location.location_name.clone(),
            update_time: dataset_description.to_string(),
            forecasts: location.forecast_windows(),
        }
    }
}
