//! Forecast lookups against the CWA open data datastore

use tracing::{info, instrument, warn};

use crate::config::WeatherConfig;
use crate::models::WeatherResult;
use crate::upstream::UpstreamClient;
use crate::{ProxyError, Result};

pub mod cwa;

/// Service answering `WeatherLookup` requests
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: UpstreamClient,
    config: WeatherConfig,
}

impl WeatherService {
    /// Create a new weather service
    pub fn new(config: WeatherConfig) -> anyhow::Result<Self> {
        let client = UpstreamClient::new("weather", config.timeout_seconds, crate::USER_AGENT)?;
        Ok(Self { client, config })
    }

    /// Look up the forecast for a city
    ///
    /// Validation and the credential check happen before any outbound call.
    #[instrument(skip(self))]
    pub async fn lookup(&self, city: &str) -> Result<WeatherResult> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ProxyError::missing_parameter(
                "Query parameter 'city' is required",
            ));
        }

        let Some(api_key) = self.config.api_key() else {
            warn!("Weather request rejected: CWA API key is not configured");
            return Err(ProxyError::misconfiguration(
                "Weather API key is not configured on the server",
            ));
        };

        let response: cwa::DatasetResponse = self
            .client
            .get_json(
                &self.config.dataset_url(),
                &[("Authorization", api_key), ("locationName", city)],
            )
            .await?;

        let records = response.records;
        let dataset_description = records
            .as_ref()
            .map(|r| r.dataset_description.as_str())
            .unwrap_or_default();
        let Some(location) = records
            .as_ref()
            .and_then(|r| r.location.as_ref())
            .and_then(|locations| locations.first())
        else {
            warn!("No forecast location matched '{}'", city);
            return Err(ProxyError::not_found(format!(
                "No weather data found for '{city}'. Use the official county or city name, e.g. 臺北市"
            )));
        };

        let result = WeatherResult::from_cwa(location, dataset_description);
        info!(
            "Retrieved {} forecast windows for {}",
            result.forecasts.len(),
            result.city
        );

        Ok(result)
    }
}
