//! Fixed-window rate limiting middleware.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::schema::{RateLimitConfig, RatePolicyConfig};
use crate::http::error::GatewayError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// One client's counter within the current window.
#[derive(Debug)]
struct RateWindow {
    count: u32,
    window_start: Instant,
}

/// Outcome of a limiter check, carried into response headers.
#[derive(Debug, Clone, Copy)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_secs: u64,
}

/// Fixed-window counter per client key.
///
/// Windows reset lazily: the first request observed after a window has
/// expired restarts the counter. Counter updates happen under the map's
/// per-key entry lock, so concurrent bursts cannot undercount.
pub struct FixedWindowLimiter {
    policy: &'static str,
    message: &'static str,
    max: u32,
    window: Duration,
    windows: DashMap<String, RateWindow>,
}

impl FixedWindowLimiter {
    pub fn new(policy: &'static str, message: &'static str, config: RatePolicyConfig) -> Self {
        Self {
            policy,
            message,
            max: config.max_requests,
            window: Duration::from_millis(config.window_ms),
            windows: DashMap::new(),
        }
    }

    /// Count one request against `key` and decide whether it may proceed.
    pub fn check(&self, key: &str) -> RateDecision {
        let now = Instant::now();

        let mut window = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| RateWindow {
                count: 0,
                window_start: now,
            });

        if now.duration_since(window.window_start) >= self.window {
            window.count = 0;
            window.window_start = now;
        }
        window.count = window.count.saturating_add(1);

        let reset = self
            .window
            .saturating_sub(now.duration_since(window.window_start));

        RateDecision {
            allowed: window.count <= self.max,
            limit: self.max,
            remaining: self.max.saturating_sub(window.count),
            reset_secs: reset.as_secs_f64().ceil() as u64,
        }
    }

    pub fn policy(&self) -> &'static str {
        self.policy
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}

/// The gateway's three coexisting policies.
pub struct RateLimits {
    pub global: FixedWindowLimiter,
    pub auth: FixedWindowLimiter,
    pub order: FixedWindowLimiter,
}

impl RateLimits {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            global: FixedWindowLimiter::new(
                "global",
                "Too many requests from this IP",
                config.global,
            ),
            auth: FixedWindowLimiter::new(
                "auth",
                "Too many authentication attempts",
                config.auth,
            ),
            order: FixedWindowLimiter::new("order", "Too many order requests", config.order),
        }
    }
}

/// Shared enforcement: check the window, attach quota headers, reject
/// with 429 without touching any later stage.
async fn enforce(
    limiter: &FixedWindowLimiter,
    key: String,
    request: Request<Body>,
    next: Next,
) -> Response {
    let decision = limiter.check(&key);

    if decision.allowed {
        let mut response = next.run(request).await;
        apply_quota_headers(&mut response, &decision);
        response
    } else {
        tracing::warn!(
            client = %key,
            policy = limiter.policy(),
            limit = decision.limit,
            "Rate limit exceeded"
        );
        metrics::record_rate_limited(limiter.policy());
        GatewayError::RateLimited {
            message: limiter.message().to_string(),
            limit: decision.limit,
            reset_secs: decision.reset_secs,
        }
        .into_response()
    }
}

fn apply_quota_headers(response: &mut Response, decision: &RateDecision) {
    let headers = response.headers_mut();
    // A more specific policy (auth, order) has already stamped its quota;
    // the outer global policy must not overwrite it.
    if headers.contains_key("x-ratelimit-limit") {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(&decision.limit.to_string()) {
        headers.insert("x-ratelimit-limit", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.reset_secs.to_string()) {
        headers.insert("x-ratelimit-reset", value);
    }
}

/// Global policy: every inbound request, keyed by client IP.
pub async fn global_rate_limit(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    enforce(&state.limits.global, addr.ip().to_string(), request, next).await
}

/// Auth-sensitive policy: login/register paths only (wired onto exactly
/// those routes), keyed by client IP.
pub async fn auth_rate_limit(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    enforce(&state.limits.auth, addr.ip().to_string(), request, next).await
}

/// Order-creation policy. Wired onto the orders route group; only the
/// creation call (POST to the group root) is counted.
pub async fn order_rate_limit(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if request.method() != Method::POST || !(path.is_empty() || path == "/") {
        return next.run(request).await;
    }
    enforce(&state.limits.order, addr.ip().to_string(), request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32, window_ms: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(
            "test",
            "Too many requests",
            RatePolicyConfig {
                window_ms,
                max_requests: max,
            },
        )
    }

    #[test]
    fn allows_up_to_the_limit_then_rejects() {
        let limiter = limiter(5, 60_000);

        for i in 1..=5 {
            let decision = limiter.check("10.0.0.1");
            assert!(decision.allowed, "request {i} should pass");
            assert_eq!(decision.remaining, 5 - i);
        }

        let decision = limiter.check("10.0.0.1");
        assert!(!decision.allowed, "6th request must be rejected");
        assert_eq!(decision.remaining, 0);
        assert!(decision.reset_secs >= 1);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(1, 60_000);

        assert!(limiter.check("10.0.0.1").allowed);
        assert!(!limiter.check("10.0.0.1").allowed);
        assert!(limiter.check("10.0.0.2").allowed, "other clients unaffected");
    }

    #[test]
    fn window_resets_lazily_after_expiry() {
        let limiter = limiter(2, 50);

        assert!(limiter.check("k").allowed);
        assert!(limiter.check("k").allowed);
        assert!(!limiter.check("k").allowed);

        std::thread::sleep(Duration::from_millis(60));

        let decision = limiter.check("k");
        assert!(decision.allowed, "first request after the window succeeds");
        assert_eq!(decision.remaining, 1);
    }

    #[test]
    fn policies_carry_their_own_messages() {
        let limits = RateLimits::new(&RateLimitConfig::default());
        assert_eq!(limits.global.message(), "Too many requests from this IP");
        assert_eq!(limits.auth.message(), "Too many authentication attempts");
        assert_eq!(limits.order.message(), "Too many order requests");
        assert_eq!(limits.auth.policy(), "auth");
    }
}
