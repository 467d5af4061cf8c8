//! Outbound health probes.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::observability::metrics;
use crate::registry::{ServiceEntry, ServiceRegistry};

/// Issues health probes against registered services and folds the results
/// into registry state.
pub struct HealthChecker {
    registry: Arc<ServiceRegistry>,
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    path: String,
}

impl HealthChecker {
    pub fn new(registry: Arc<ServiceRegistry>, config: &HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            registry,
            client,
            timeout: Duration::from_millis(config.timeout_ms),
            path: config.path.clone(),
        }
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Probe a single service by name. Unknown names report `false`.
    pub async fn probe(&self, name: &str) -> bool {
        match self.registry.entry(name) {
            Some(entry) => self.probe_entry(&entry).await,
            None => {
                tracing::warn!(service = %name, "Probe requested for unknown service");
                false
            }
        }
    }

    /// Probe every registered service concurrently and wait for all
    /// results. Total duration is bounded by the slowest single probe,
    /// not the sum.
    pub async fn probe_all(&self) {
        let entries = self.registry.entries();
        futures_util::future::join_all(
            entries.iter().map(|entry| self.probe_entry(entry)),
        )
        .await;
    }

    /// One bounded-timeout GET against `{base_url}{path}`. HTTP 200 within
    /// the timeout is the sole success criterion. Failures never escape:
    /// they become registry state.
    async fn probe_entry(&self, entry: &ServiceEntry) -> bool {
        let url = match entry.base_url().join(&self.path) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(service = %entry.name(), error = %e, "Failed to build health check url");
                entry.mark_failure(Utc::now());
                return false;
            }
        };

        let request = match Request::builder()
            .method("GET")
            .uri(url.as_str())
            .header("user-agent", "shopsphere-gateway-health-check")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(service = %entry.name(), error = %e, "Failed to build health check request");
                entry.mark_failure(Utc::now());
                return false;
            }
        };

        let response_future = self.client.request(request);

        let healthy = match time::timeout(self.timeout, response_future).await {
            Ok(Ok(response)) => {
                let ok = response.status() == StatusCode::OK;
                if ok {
                    tracing::debug!(service = %entry.name(), "Health check passed");
                } else {
                    tracing::warn!(
                        service = %entry.name(),
                        status = %response.status(),
                        "Health check failed: non-200 status"
                    );
                }
                ok
            }
            Ok(Err(e)) => {
                tracing::warn!(service = %entry.name(), error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(service = %entry.name(), "Health check failed: timeout");
                false
            }
        };

        let now = Utc::now();
        if healthy {
            entry.mark_success(now);
        } else {
            entry.mark_failure(now);
        }

        metrics::record_service_health(entry.name(), healthy);

        healthy
    }
}
