use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::{ProxyConfig, ServerConfig};
use crate::{ProxyError, VERSION};

/// Assemble the full application router
pub fn app(server: &ServerConfig, state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .nest("/api", api::router(state))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(server.request_timeout_seconds.into()),
        ))
        .layer(map_response(timeout_as_json))
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: ProxyConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let app = app(&config.server, state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if server.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Taiwan weather proxy",
        "version": VERSION,
        "endpoints": [
            "GET /health",
            "GET /api/weather?city=<name>",
            "GET /api/weather/kaohsiung",
            "GET /api/reverse-geocode?lat=<num>&lng=<num>",
        ],
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn route_not_found() -> ProxyError {
    ProxyError::not_found("Route not found")
}

pub(crate) async fn method_not_allowed(method: Method) -> ProxyError {
    ProxyError::method_not_allowed(method.as_str())
}

/// The timeout layer answers with an empty 504; handlers always set a JSON body
async fn timeout_as_json(response: Response) -> Response {
    if response.status() == StatusCode::GATEWAY_TIMEOUT
        && !response.headers().contains_key(header::CONTENT_TYPE)
    {
        return ProxyError::internal("Request exceeded the server timeout").into_response();
    }
    response
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
