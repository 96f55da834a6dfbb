use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use taiwan_weather_proxy::config::LoggingConfig;
use taiwan_weather_proxy::{ProxyConfig, VERSION, web};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ProxyConfig::load()?;
    init_tracing(&config.logging);

    tracing::info!(
        version = VERSION,
        bind_address = %config.server.bind_address(),
        address_order = ?config.geocoding.address_order,
        "Configuration loaded"
    );

    if config.weather.api_key().is_none() {
        tracing::warn!("CWA_API_KEY is not set; weather requests will fail");
    }

    web::run(config).await
}
