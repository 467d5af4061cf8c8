//! Service registry.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ServiceConfig[] → register() → ServiceEntry per logical service
//!
//! Health loop / manual trigger:
//!     probe results → mark_success()/mark_failure()
//!     → atomic swap of the entry's HealthSnapshot
//!
//! Request path:
//!     get(name) → Some(target) only when registered AND healthy
//!
//! Status surface:
//!     status()/lookup() → owned copies, never the live entries
//! ```
//!
//! # Design Decisions
//! - Entries are never removed once registered; only health state changes
//! - Health state is replace-by-copy (ArcSwap): readers never observe a
//!   torn entry, and no lock is held across a network call
//! - A registered-but-unhealthy service is indistinguishable from an
//!   unknown one on the proxy path; the status surface keeps the
//!   distinction

pub mod entry;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use url::Url;

pub use entry::{HealthSnapshot, ServiceEntry};

/// Registry construction/registration errors.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("service '{0}' is already registered")]
    Duplicate(String),

    #[error("service '{name}' has invalid base url '{url}'")]
    InvalidBaseUrl { name: String, url: String },
}

/// Resolved proxy target for a healthy service.
#[derive(Debug, Clone)]
pub struct ServiceTarget {
    pub name: String,
    pub base_url: Url,
}

/// Status snapshot of a single service, for the observability surface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub name: String,
    pub url: String,
    pub healthy: bool,
    pub last_check: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

/// Holds one entry per logical backend service.
///
/// Shared between the request path (reader) and the health monitor
/// (writer); all methods take `&self`.
#[derive(Default)]
pub struct ServiceRegistry {
    entries: DashMap<String, Arc<ServiceEntry>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Register a logical service. Called once per backend at startup.
    pub fn register(&self, name: &str, base_url: &str) -> Result<(), RegistryError> {
        let url = Url::parse(base_url).map_err(|_| RegistryError::InvalidBaseUrl {
            name: name.to_string(),
            url: base_url.to_string(),
        })?;

        use dashmap::mapref::entry::Entry;
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(ServiceEntry::new(name.to_string(), url)));
                tracing::info!(service = %name, url = %base_url, "Service registered");
                Ok(())
            }
        }
    }

    /// Resolve a service for proxying. Returns `None` when the name is
    /// unknown OR the service is currently unhealthy: callers must not be
    /// handed a dead URL to fall back to.
    pub fn get(&self, name: &str) -> Option<ServiceTarget> {
        let entry = self.entries.get(name)?;
        let snapshot = entry.snapshot();
        if !snapshot.healthy {
            tracing::warn!(
                service = %name,
                consecutive_failures = snapshot.consecutive_failures,
                "Service is not available"
            );
            return None;
        }
        Some(ServiceTarget {
            name: entry.name().to_string(),
            base_url: entry.base_url().clone(),
        })
    }

    /// Status-surface lookup: reports a registered service regardless of
    /// health, so operators can tell "unknown" apart from "unhealthy".
    pub fn lookup(&self, name: &str) -> Option<ServiceStatus> {
        self.entries.get(name).map(|entry| entry.status())
    }

    /// Owned status snapshot of every entry, sorted by name.
    pub fn status(&self) -> Vec<ServiceStatus> {
        let mut statuses: Vec<ServiceStatus> =
            self.entries.iter().map(|e| e.value().status()).collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    /// All entries, for the prober.
    pub(crate) fn entries(&self) -> Vec<Arc<ServiceEntry>> {
        self.entries.iter().map(|e| e.value().clone()).collect()
    }

    pub(crate) fn entry(&self, name: &str) -> Option<Arc<ServiceEntry>> {
        self.entries.get(name).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(name: &str) -> ServiceRegistry {
        let registry = ServiceRegistry::new();
        registry.register(name, "http://localhost:8001").unwrap();
        registry
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = registry_with("user");
        let err = registry.register("user", "http://localhost:9999").unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(n) if n == "user"));
        // The original entry survives
        assert_eq!(registry.get("user").unwrap().base_url.as_str(), "http://localhost:8001/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let registry = ServiceRegistry::new();
        let err = registry.register("user", "not a url").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn get_hides_unhealthy_entries() {
        let registry = registry_with("order");
        assert!(registry.get("order").is_some());

        registry.entry("order").unwrap().mark_failure(Utc::now());
        assert!(registry.get("order").is_none(), "unhealthy must look unregistered");
        assert!(registry.get("ghost").is_none());
    }

    #[test]
    fn lookup_preserves_the_unhealthy_distinction() {
        let registry = registry_with("order");
        registry.entry("order").unwrap().mark_failure(Utc::now());

        // Proxy path: gone. Status surface: visible and unhealthy.
        assert!(registry.get("order").is_none());
        let status = registry.lookup("order").unwrap();
        assert!(!status.healthy);
        assert_eq!(status.consecutive_failures, 1);
        assert!(registry.lookup("ghost").is_none());
    }

    #[test]
    fn status_is_a_sorted_owned_snapshot() {
        let registry = ServiceRegistry::new();
        registry.register("product", "http://localhost:8002").unwrap();
        registry.register("order", "http://localhost:8003").unwrap();
        registry.register("user", "http://localhost:8001").unwrap();

        let statuses = registry.status();
        let names: Vec<&str> = statuses.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["order", "product", "user"]);
        // Optimistic until first probe
        assert!(statuses.iter().all(|s| s.healthy && s.last_check.is_none()));
    }
}
