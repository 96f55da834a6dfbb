//! Outbound HTTP plumbing shared by the weather and geocoding lookups
//!
//! Every call site classifies failures the same way:
//! - the remote service answered with a failure status: [`ProxyError::Upstream`]
//!   carrying that status and the upstream's own message
//! - no response at all (connect error, timeout): [`ProxyError::Internal`]

use std::time::{Duration, Instant};

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::ProxyError;

/// HTTP client bound to one upstream service
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    service: &'static str,
}

impl UpstreamClient {
    /// Create a client with a bounded timeout for the named service
    pub fn new(service: &'static str, timeout_seconds: u32, user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.into()))
            .user_agent(user_agent)
            .build()
            .with_context(|| format!("Failed to create HTTP client for {service}"))?;

        Ok(Self { client, service })
    }

    /// GET `url` with `query` and decode the JSON body
    #[instrument(skip(self, query), fields(service = self.service))]
    pub async fn get_json<T, Q>(&self, url: &str, query: &Q) -> Result<T, ProxyError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let start_time = Instant::now();

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!("No response from {}: {}", self.service, e);
                ProxyError::internal(format!("{} request failed: {e}", self.service))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProxyError::internal(format!("Failed to read {} response: {e}", self.service))
        })?;

        debug!(
            "{} answered {} in {:.3}s",
            self.service,
            status,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            return Err(ProxyError::upstream(
                status.as_u16(),
                upstream_message(status, &body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProxyError::internal(format!("Invalid {} response: {e}", self.service))
        })
    }
}

/// Extract the upstream's own explanation from a failure body
///
/// Prefers a JSON `message` string, then the raw body, then the status'
/// canonical reason.
#[must_use]
pub fn upstream_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body)
        && let Some(Value::String(message)) = map.get("message")
    {
        return message.clone();
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Upstream request failed")
        .to_string()
}
