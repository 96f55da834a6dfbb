//! Error types and handling for the weather proxy
//!
//! Every handler converts its faults into one [`ProxyError`] kind before
//! responding, so clients always receive a JSON body with a stable `error`
//! label and a human-readable `message`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for request handling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// A required query parameter was absent or empty
    #[error("Missing parameter: {message}")]
    MissingParameter { message: String },

    /// The server lacks a credential it needs to serve the request
    #[error("Server misconfiguration: {message}")]
    ServerMisconfiguration { message: String },

    /// Known route, unsupported HTTP method
    #[error("Method not allowed: {method}")]
    MethodNotAllowed { method: String },

    /// Upstream answered, but with nothing usable
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Upstream answered with a failure status
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// No upstream response, or a local fault
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl ProxyError {
    /// Create a new missing-parameter error
    pub fn missing_parameter<S: Into<String>>(message: S) -> Self {
        Self::MissingParameter {
            message: message.into(),
        }
    }

    /// Create a new misconfiguration error
    pub fn misconfiguration<S: Into<String>>(message: S) -> Self {
        Self::ServerMisconfiguration {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new method-not-allowed error
    pub fn method_not_allowed<S: Into<String>>(method: S) -> Self {
        Self::MethodNotAllowed {
            method: method.into(),
        }
    }

    /// Create a new upstream error carrying the upstream status code
    pub fn upstream<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Create a new internal error; `detail` is logged, never sent to clients
    pub fn internal<S: Into<String>>(detail: S) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    /// HTTP status this error is reported with
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MissingParameter { .. } => StatusCode::BAD_REQUEST,
            ProxyError::ServerMisconfiguration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::NotFound { .. } => StatusCode::NOT_FOUND,
            ProxyError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label for the `error` field of the response body
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ProxyError::MissingParameter { .. } => "MissingParameter",
            ProxyError::ServerMisconfiguration { .. } => "ServerMisconfiguration",
            ProxyError::NotFound { .. } => "NotFound",
            ProxyError::MethodNotAllowed { .. } => "MethodNotAllowed",
            ProxyError::Upstream { .. } => "UpstreamError",
            ProxyError::Internal { .. } => "InternalError",
        }
    }

    /// Get the client-facing message
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            ProxyError::MissingParameter { message }
            | ProxyError::ServerMisconfiguration { message }
            | ProxyError::NotFound { message }
            | ProxyError::Upstream { message, .. } => message.clone(),
            ProxyError::MethodNotAllowed { method } => {
                format!("Method {method} is not supported on this route")
            }
            ProxyError::Internal { .. } => {
                "Unable to reach the upstream service. Please try again later.".to_string()
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::Internal { detail } => tracing::error!(%detail, "request failed"),
            ProxyError::Upstream { status, message } => {
                tracing::warn!(status, %message, "upstream rejected request");
            }
            other => tracing::debug!(error = %other, "request rejected"),
        }

        let body = Json(json!({
            "success": false,
            "error": self.label(),
            "message": self.message(),
        }));
        (self.status_code(), body).into_response()
    }
}
