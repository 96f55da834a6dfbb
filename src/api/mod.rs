use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    ProxyConfig, ProxyError,
    location_resolver::LocationResolver,
    models::WeatherResult,
    weather::WeatherService,
};

/// City served by the fixed-city convenience route
pub const KAOHSIUNG: &str = "高雄市";

/// Services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherService>,
    pub resolver: Arc<LocationResolver>,
}

impl AppState {
    /// Build the upstream services from the startup configuration
    pub fn from_config(config: &ProxyConfig) -> anyhow::Result<Self> {
        let weather = WeatherService::new(config.weather.clone())?;
        let resolver = LocationResolver::new(config.geocoding.clone())?;
        Ok(Self {
            weather: Arc::new(weather),
            resolver: Arc::new(resolver),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Serialize)]
pub struct WeatherResponse {
    pub success: bool,
    pub data: WeatherResult,
}

#[derive(Serialize)]
pub struct ReverseGeocodeResponse {
    pub success: bool,
    pub city: String,
}

fn invalid_query(rejection: QueryRejection) -> ProxyError {
    ProxyError::missing_parameter(rejection.body_text())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(get_weather))
        .route("/weather/kaohsiung", get(get_kaohsiung_weather))
        .route("/reverse-geocode", get(reverse_geocode))
        .method_not_allowed_fallback(crate::web::method_not_allowed)
        .with_state(state)
}

async fn get_weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<WeatherResponse>, ProxyError> {
    let Query(query) = query.map_err(invalid_query)?;
    let city = query.city.unwrap_or_default();
    let data = state.weather.lookup(&city).await?;
    Ok(Json(WeatherResponse {
        success: true,
        data,
    }))
}

async fn get_kaohsiung_weather(
    State(state): State<AppState>,
) -> Result<Json<WeatherResponse>, ProxyError> {
    let data = state.weather.lookup(KAOHSIUNG).await?;
    Ok(Json(WeatherResponse {
        success: true,
        data,
    }))
}

async fn reverse_geocode(
    State(state): State<AppState>,
    query: Result<Query<ReverseGeocodeQuery>, QueryRejection>,
) -> Result<Json<ReverseGeocodeResponse>, ProxyError> {
    let Query(query) = query.map_err(invalid_query)?;
    let lat = query.lat.unwrap_or_default();
    let lng = query.lng.unwrap_or_default();
    let result = state.resolver.reverse_geocode(&lat, &lng).await?;
    Ok(Json(ReverseGeocodeResponse {
        success: true,
        city: result.city,
    }))
}
