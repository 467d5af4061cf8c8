//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Deployment environment ("development" or "production").
    pub environment: Environment,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend service definitions.
    #[serde(default = "default_services")]
    pub services: Vec<ServiceConfig>,

    /// Token verification settings.
    pub auth: AuthConfig,

    /// Rate limiting policies.
    pub rate_limit: RateLimitConfig,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// CORS settings.
    pub cors: CorsConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            listener: ListenerConfig::default(),
            services: default_services(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            health_check: HealthCheckConfig::default(),
            timeouts: TimeoutConfig::default(),
            cors: CorsConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// True when running in the development environment. Controls whether
    /// internal error detail is exposed to clients.
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Look up a configured service by name.
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Environment::Production),
            "development" => Ok(Environment::Development),
            _ => Err(()),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// One logical backend service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Unique service identifier ("user", "product", "order").
    pub name: String,

    /// Base URL of the single endpoint serving this service.
    pub url: String,

    /// Inbound path prefix routed to this service.
    pub route_prefix: String,
}

/// Token verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret for HS256 token signatures.
    pub jwt_secret: String,

    /// Clock-skew tolerance applied to expiry checks, in seconds.
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            jwt_secret: "your-jwt-secret-key".to_string(),
            leeway_secs: 30,
        }
    }
}

/// Rate limiting configuration. The three policies are evaluated
/// independently; a single request can be counted in more than one window.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Applied to all inbound traffic, keyed by client IP.
    pub global: RatePolicyConfig,

    /// Applied to login/register paths only.
    pub auth: RatePolicyConfig,

    /// Applied to order creation only.
    pub order: RatePolicyConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global: RatePolicyConfig {
                window_ms: 15 * 60 * 1000,
                max_requests: 100,
            },
            auth: RatePolicyConfig {
                window_ms: 15 * 60 * 1000,
                max_requests: 5,
            },
            order: RatePolicyConfig {
                window_ms: 60 * 1000,
                max_requests: 10,
            },
        }
    }
}

/// One fixed-window rate limiting policy.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RatePolicyConfig {
    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Requests allowed per key per window.
    pub max_requests: u32,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Probe interval in milliseconds.
    pub interval_ms: u64,

    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,

    /// Path probed on each backend.
    pub path: String,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            timeout_ms: 5_000,
            path: "/health".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total inbound request timeout in seconds.
    pub request_secs: u64,

    /// Per-request upstream call timeout in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 10,
        }
    }
}

/// CORS settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origin.
    pub origin: String,

    /// Whether credentialed requests are allowed.
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
            allow_credentials: true,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

pub(crate) fn default_services() -> Vec<ServiceConfig> {
    vec![
        ServiceConfig {
            name: "user".to_string(),
            url: "http://localhost:8001".to_string(),
            route_prefix: "/api/users".to_string(),
        },
        ServiceConfig {
            name: "product".to_string(),
            url: "http://localhost:8002".to_string(),
            route_prefix: "/api/products".to_string(),
        },
        ServiceConfig {
            name: "order".to_string(),
            url: "http://localhost:8003".to_string(),
            route_prefix: "/api/orders".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_three_services() {
        let config = GatewayConfig::default();

        assert_eq!(config.services.len(), 3);
        let names: Vec<&str> = config.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["user", "product", "order"]);
        assert!(config.is_development());
        assert_eq!(config.rate_limit.auth.max_requests, 5);
        assert_eq!(config.rate_limit.order.window_ms, 60_000);
    }

    #[test]
    fn environment_parses_from_str() {
        assert_eq!("production".parse(), Ok(Environment::Production));
        assert_eq!("development".parse(), Ok(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
    }
}
