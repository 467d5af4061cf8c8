//! Reverse-proxy forwarding.
//!
//! # Responsibilities
//! - Resolve the target service via the routing table and registry
//! - Forward method, headers and body verbatim (minus hop-by-hop headers)
//! - Inject identity (x-user-id) derived from the AuthContext
//! - Convert upstream failures into the 503 contract
//!
//! # Design Decisions
//! - No retries: an unavailable backend answers immediately, keeping
//!   gateway latency bounded; retrying is the client's concern
//! - A request that already entered the upstream call runs to completion
//!   even if the client goes away; the result is simply discarded

use std::time::Instant;

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{uri::Uri, Request},
    response::{IntoResponse, Response},
};
use tokio::time;

use crate::auth::AuthContext;
use crate::http::error::GatewayError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Headers scoped to a single hop, never forwarded in either direction.
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Forward one authorized, rate-limit-cleared request to its backend.
pub async fn proxy_handler(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    request: Request<Body>,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = original_uri.path().to_string();

    // Nested routers see a stripped URI; route on the original path.
    let (service, rewritten) = match state.routes.resolve(&path) {
        Some(rule) => (rule.service.clone(), rule.rewrite(&path)),
        None => {
            tracing::warn!(path = %path, method = %method, "No route for proxied path");
            return GatewayError::RouteNotFound {
                path,
                method: method.to_string(),
            }
            .into_response();
        }
    };

    // Sole availability gate: a registered-but-unhealthy backend looks
    // exactly like an unknown one and produces zero upstream calls.
    let Some(target) = state.registry.get(&service) else {
        tracing::warn!(
            method = %method,
            path = %path,
            service = %service,
            latency_ms = started.elapsed().as_millis() as u64,
            "Proxy target unavailable"
        );
        metrics::record_proxied_request(method.as_str(), 503, &service, started);
        return GatewayError::ServiceUnavailable { service }.into_response();
    };

    let path_and_query = match original_uri.query() {
        Some(query) => format!("{rewritten}?{query}"),
        None => rewritten,
    };
    let uri = match Uri::builder()
        .scheme(target.base_url.scheme())
        .authority(target.base_url.authority())
        .path_and_query(path_and_query.as_str())
        .build()
    {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(service = %service, error = %e, "Failed to build upstream uri");
            return internal_error(&state, e.to_string());
        }
    };

    let (parts, body) = request.into_parts();

    let mut builder = Request::builder().method(parts.method.clone()).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        for (name, value) in parts.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        for name in HOP_BY_HOP_HEADERS {
            headers.remove(name);
        }
        // The client sets Host from the upstream authority.
        headers.remove("host");

        if let Some(ctx) = parts.extensions.get::<AuthContext>() {
            if let Some(subject) = ctx.subject.as_deref() {
                if let Ok(value) = subject.parse() {
                    headers.insert("x-user-id", value);
                }
            }
        }
    }

    let upstream_request = match builder.body(body) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(service = %service, error = %e, "Failed to build upstream request");
            return internal_error(&state, e.to_string());
        }
    };

    match time::timeout(state.upstream_timeout, state.client.request(upstream_request)).await {
        Ok(Ok(response)) => {
            let status = response.status();
            tracing::info!(
                method = %method,
                path = %path,
                service = %service,
                status = status.as_u16(),
                latency_ms = started.elapsed().as_millis() as u64,
                "Proxied request"
            );
            metrics::record_proxied_request(method.as_str(), status.as_u16(), &service, started);

            let (mut response_parts, response_body) = response.into_parts();
            for name in HOP_BY_HOP_HEADERS {
                response_parts.headers.remove(name);
            }
            Response::from_parts(response_parts, Body::new(response_body))
        }
        Ok(Err(e)) => {
            tracing::warn!(
                method = %method,
                path = %path,
                service = %service,
                error = %e,
                latency_ms = started.elapsed().as_millis() as u64,
                "Upstream connection failed"
            );
            metrics::record_proxied_request(method.as_str(), 503, &service, started);
            GatewayError::ServiceUnavailable { service }.into_response()
        }
        Err(_) => {
            tracing::warn!(
                method = %method,
                path = %path,
                service = %service,
                timeout_ms = state.upstream_timeout.as_millis() as u64,
                "Upstream call timed out"
            );
            metrics::record_proxied_request(method.as_str(), 503, &service, started);
            GatewayError::ServiceUnavailable { service }.into_response()
        }
    }
}

fn internal_error(state: &AppState, detail: String) -> Response {
    GatewayError::Internal {
        detail: state.config.is_development().then_some(detail),
    }
    .into_response()
}
