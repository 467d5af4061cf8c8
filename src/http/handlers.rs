//! Operator-facing handlers: banner, liveness, service status.

use axum::{
    extract::{OriginalUri, Path, State},
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::http::error::GatewayError;
use crate::http::server::AppState;

/// Root banner with the configured service endpoints.
pub async fn root_info(State(state): State<AppState>) -> Json<Value> {
    let services: serde_json::Map<String, Value> = state
        .config
        .services
        .iter()
        .map(|s| (s.name.clone(), Value::String(s.url.clone())))
        .collect();

    Json(json!({
        "message": "ShopSphere API Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "timestamp": Utc::now(),
        "services": services,
    }))
}

/// Gateway liveness: always healthy while the process is serving,
/// independent of backend health.
pub async fn gateway_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "api-gateway",
        "timestamp": Utc::now(),
        "uptimeSecs": state.started_at.elapsed().as_secs(),
    }))
}

/// Status snapshot of every registered service plus an aggregate summary.
pub async fn services_status(State(state): State<AppState>) -> Json<Value> {
    let services = state.registry.status();
    let healthy = services.iter().filter(|s| s.healthy).count();
    let total = services.len();

    Json(json!({
        "status": if healthy == total { "healthy" } else { "degraded" },
        "timestamp": Utc::now(),
        "services": services,
        "summary": {
            "total": total,
            "healthy": healthy,
            "unhealthy": total - healthy,
        },
    }))
}

/// Single-service status. Unlike the proxy path, this surface keeps the
/// distinction between "never registered" (404) and "registered but
/// unhealthy" (reported as unhealthy).
pub async fn service_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.registry.lookup(&name) {
        Some(status) => Json(json!({
            "service": status.name,
            "status": if status.healthy { "healthy" } else { "unhealthy" },
            "url": status.url,
            "lastCheck": status.last_check,
            "consecutiveFailures": status.consecutive_failures,
        }))
        .into_response(),
        None => GatewayError::UnknownService { name }.into_response(),
    }
}

/// Operator-triggered immediate probe of every service.
pub async fn trigger_health_check(State(state): State<AppState>) -> Json<Value> {
    tracing::info!("Manual health check triggered");
    state.health.probe_all().await;

    Json(json!({
        "message": "Health check completed",
        "timestamp": Utc::now(),
        "services": state.registry.status(),
    }))
}

/// Fallback for unrecognized paths anywhere in the router.
pub async fn not_found(OriginalUri(uri): OriginalUri, method: Method) -> Response {
    tracing::warn!(path = %uri.path(), method = %method, "Route not found");
    GatewayError::RouteNotFound {
        path: uri.path().to_string(),
        method: method.to_string(),
    }
    .into_response()
}
