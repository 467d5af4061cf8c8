//! Gateway-originated error responses.
//!
//! Every failure the gateway itself produces renders the same JSON shape:
//! `{"error": <string>, ...optional context fields}`. Raw upstream
//! connection errors never reach the client.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// The gateway's error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A protected route was called without credentials.
    #[error("Access token required")]
    MissingToken,

    /// Credentials were presented but failed verification.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// A rate-limit window is exhausted for this client.
    #[error("{message}")]
    RateLimited {
        message: String,
        limit: u32,
        reset_secs: u64,
    },

    /// The registry reported the target unavailable, or the upstream call
    /// failed mid-flight. Both collapse to the same client contract.
    #[error("{service} service temporarily unavailable")]
    ServiceUnavailable { service: String },

    /// No route recognizes the requested path.
    #[error("Route not found")]
    RouteNotFound { path: String, method: String },

    /// Status API asked about a name that was never registered.
    #[error("Service not found")]
    UnknownService { name: String },

    /// Unexpected failure inside the gateway itself. Detail is only
    /// populated outside production.
    #[error("Internal server error")]
    Internal { detail: Option<String> },
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingToken => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidToken => StatusCode::FORBIDDEN,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::RouteNotFound { .. } | GatewayError::UnknownService { .. } => {
                StatusCode::NOT_FOUND
            }
            GatewayError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            GatewayError::RouteNotFound { path, method } => json!({
                "error": "Route not found",
                "path": path,
                "method": method,
            }),
            GatewayError::UnknownService { name } => json!({
                "error": "Service not found",
                "service": name,
            }),
            GatewayError::Internal { detail } => match detail {
                Some(detail) => json!({ "error": "Internal server error", "message": detail }),
                None => json!({ "error": "Internal server error" }),
            },
            other => json!({ "error": other.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();

        if let GatewayError::RateLimited {
            limit, reset_secs, ..
        } = self
        {
            let headers = response.headers_mut();
            if let Ok(value) = HeaderValue::from_str(&limit.to_string()) {
                headers.insert("x-ratelimit-limit", value);
            }
            headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
            if let Ok(value) = HeaderValue::from_str(&reset_secs.to_string()) {
                headers.insert("x-ratelimit-reset", value.clone());
                headers.insert("retry-after", value);
            }
        }

        response
    }
}
