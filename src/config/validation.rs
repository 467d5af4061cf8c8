//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check service URLs parse and use an http scheme
//! - Validate value ranges (windows, limits, intervals > 0)
//! - Detect duplicate service names and prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("no services configured")]
    NoServices,

    #[error("service '{service}' has invalid url '{url}'")]
    InvalidServiceUrl { service: String, url: String },

    #[error("service '{service}' url '{url}' must use http or https")]
    UnsupportedScheme { service: String, url: String },

    #[error("duplicate service name '{0}'")]
    DuplicateService(String),

    #[error("service '{service}' has invalid route prefix '{prefix}'")]
    InvalidRoutePrefix { service: String, prefix: String },

    #[error("duplicate route prefix '{0}'")]
    DuplicateRoutePrefix(String),

    #[error("jwt secret must not be empty")]
    EmptyJwtSecret,

    #[error("rate limit policy '{0}' must allow at least one request")]
    ZeroRateLimit(&'static str),

    #[error("rate limit policy '{0}' must have a non-zero window")]
    ZeroRateWindow(&'static str),

    #[error("health check interval must be non-zero")]
    ZeroHealthInterval,

    #[error("health check timeout must be non-zero")]
    ZeroHealthTimeout,
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.services.is_empty() {
        errors.push(ValidationError::NoServices);
    }

    let mut names = HashSet::new();
    let mut prefixes = HashSet::new();
    for service in &config.services {
        if !names.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateService(service.name.clone()));
        }

        match Url::parse(&service.url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(_) => errors.push(ValidationError::UnsupportedScheme {
                service: service.name.clone(),
                url: service.url.clone(),
            }),
            Err(_) => errors.push(ValidationError::InvalidServiceUrl {
                service: service.name.clone(),
                url: service.url.clone(),
            }),
        }

        if !service.route_prefix.starts_with('/') || service.route_prefix.len() < 2 {
            errors.push(ValidationError::InvalidRoutePrefix {
                service: service.name.clone(),
                prefix: service.route_prefix.clone(),
            });
        } else if !prefixes.insert(service.route_prefix.as_str()) {
            errors.push(ValidationError::DuplicateRoutePrefix(
                service.route_prefix.clone(),
            ));
        }
    }

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::EmptyJwtSecret);
    }

    for (name, policy) in [
        ("global", &config.rate_limit.global),
        ("auth", &config.rate_limit.auth),
        ("order", &config.rate_limit.order),
    ] {
        if policy.max_requests == 0 {
            errors.push(ValidationError::ZeroRateLimit(name));
        }
        if policy.window_ms == 0 {
            errors.push(ValidationError::ZeroRateWindow(name));
        }
    }

    if config.health_check.interval_ms == 0 {
        errors.push(ValidationError::ZeroHealthInterval);
    }
    if config.health_check.timeout_ms == 0 {
        errors.push(ValidationError::ZeroHealthTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.services[0].url = "ftp://files.example.com".to_string();
        config.services[1].url = "not a url".to_string();
        config.rate_limit.auth.max_requests = 0;
        config.auth.jwt_secret.clear();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5, "expected all errors reported: {errors:?}");
    }

    #[test]
    fn duplicate_names_and_prefixes_rejected() {
        let mut config = GatewayConfig::default();
        config.services[1].name = "user".to_string();
        config.services[2].route_prefix = "/api/users".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateService(n) if n == "user")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateRoutePrefix(p) if p == "/api/users")));
    }
}
