//! Configuration loading from disk and environment.

use std::env;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: TOML file if given, defaults otherwise, then
/// environment overrides, then semantic validation.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(p) => toml::from_str(&std::fs::read_to_string(p)?)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Environment variable overrides. Names are the deployment contract of the
/// original gateway; unparsable numeric values are ignored.
fn apply_env_overrides(config: &mut GatewayConfig) {
    if let Ok(env_name) = env::var("GATEWAY_ENV") {
        if let Ok(parsed) = env_name.parse() {
            config.environment = parsed;
        }
    }
    if let Ok(port) = env::var("PORT") {
        if port.parse::<u16>().is_ok() {
            config.listener.bind_address = format!("0.0.0.0:{port}");
        }
    }

    for (var, service) in [
        ("USER_SERVICE_URL", "user"),
        ("PRODUCT_SERVICE_URL", "product"),
        ("ORDER_SERVICE_URL", "order"),
    ] {
        if let Ok(url) = env::var(var) {
            if let Some(entry) = config.services.iter_mut().find(|s| s.name == service) {
                entry.url = url;
            }
        }
    }

    if let Ok(secret) = env::var("JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }
    if let Some(window_ms) = env_u64("RATE_LIMIT_WINDOW_MS") {
        config.rate_limit.global.window_ms = window_ms;
    }
    if let Some(max) = env_u64("RATE_LIMIT_MAX_REQUESTS") {
        config.rate_limit.global.max_requests = max as u32;
    }
    if let Ok(origin) = env::var("CORS_ORIGIN") {
        config.cors.origin = origin;
    }
    if let Some(interval_ms) = env_u64("HEALTH_CHECK_INTERVAL") {
        config.health_check.interval_ms = interval_ms;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        config.observability.log_level = level;
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
