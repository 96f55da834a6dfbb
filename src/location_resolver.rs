//! Location Resolution Module
//!
//! This module resolves a coordinate pair into the administrative-area name
//! the weather dataset is keyed by, via Nominatim-style reverse geocoding.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::city_names::normalize_city_name;
use crate::config::GeocodingConfig;
use crate::models::GeocodeResult;
use crate::upstream::UpstreamClient;
use crate::{ProxyError, Result};

/// Preference order over the upstream address fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressOrder {
    /// `county → city → town → city_district → state`
    #[default]
    Detailed,
    /// `city → county → state`
    Simple,
}

/// Address fields the selection looks at
#[derive(Debug, Default, Deserialize)]
pub struct Address {
    pub county: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub city_district: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

impl Address {
    /// First non-empty field in the given preference order
    #[must_use]
    pub fn select(&self, order: AddressOrder) -> Option<&str> {
        let candidates = match order {
            AddressOrder::Detailed => vec![
                &self.county,
                &self.city,
                &self.town,
                &self.city_district,
                &self.state,
            ],
            AddressOrder::Simple => vec![&self.city, &self.county, &self.state],
        };

        candidates
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|name| !name.is_empty())
    }
}

/// Service answering `ReverseGeocode` requests
#[derive(Debug, Clone)]
pub struct LocationResolver {
    client: UpstreamClient,
    config: GeocodingConfig,
}

impl LocationResolver {
    /// Create a new resolver
    pub fn new(config: GeocodingConfig) -> anyhow::Result<Self> {
        let client = UpstreamClient::new("geocoding", config.timeout_seconds, &config.user_agent)?;
        Ok(Self { client, config })
    }

    /// Resolve coordinates to a normalized administrative-area name
    ///
    /// Coordinates are forwarded as given; no range check is applied.
    #[instrument(skip(self))]
    pub async fn reverse_geocode(&self, lat: &str, lng: &str) -> Result<GeocodeResult> {
        let (lat, lng) = (lat.trim(), lng.trim());
        if lat.is_empty() || lng.is_empty() {
            return Err(ProxyError::missing_parameter(
                "Query parameters 'lat' and 'lng' are required",
            ));
        }

        debug!("Reverse geocoding ({}, {})", lat, lng);

        let response: ReverseResponse = self
            .client
            .get_json(
                &self.config.reverse_url(),
                &[
                    ("format", "jsonv2"),
                    ("lat", lat),
                    ("lon", lng),
                    ("accept-language", "zh-TW"),
                    ("addressdetails", "1"),
                ],
            )
            .await?;

        let address = response.address.unwrap_or_default();
        let Some(name) = address.select(self.config.address_order) else {
            warn!("No administrative area found for ({}, {})", lat, lng);
            return Err(ProxyError::not_found(format!(
                "No city or county found for coordinates ({lat}, {lng})"
            )));
        };

        let city = normalize_city_name(name);
        info!("Resolved ({}, {}) to {}", lat, lng, city);

        Ok(GeocodeResult::new(city))
    }
}
