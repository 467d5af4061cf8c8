//! A single registry entry and its atomically swapped health state.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use url::Url;

use crate::registry::ServiceStatus;

/// Point-in-time health state of one service.
///
/// Invariant: `healthy == (consecutive_failures == 0)` after any probe has
/// run; before the first probe the entry is optimistically healthy with no
/// `last_checked` stamp, matching how the registry behaved historically.
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    pub healthy: bool,
    pub last_checked: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

impl HealthSnapshot {
    fn initial() -> Self {
        Self {
            healthy: true,
            last_checked: None,
            consecutive_failures: 0,
        }
    }
}

/// One logical backend service.
///
/// `name` and `base_url` are immutable after registration. Health state is
/// replaced wholesale on every probe result so concurrent readers always
/// see a consistent snapshot.
pub struct ServiceEntry {
    name: String,
    base_url: Url,
    health: ArcSwap<HealthSnapshot>,
}

impl ServiceEntry {
    pub fn new(name: String, base_url: Url) -> Self {
        Self {
            name,
            base_url,
            health: ArcSwap::from_pointee(HealthSnapshot::initial()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current health snapshot (cheap atomic load).
    pub fn snapshot(&self) -> Arc<HealthSnapshot> {
        self.health.load_full()
    }

    /// Record a successful probe.
    pub fn mark_success(&self, checked_at: DateTime<Utc>) {
        let was_healthy = self.snapshot().healthy;
        self.health.store(Arc::new(HealthSnapshot {
            healthy: true,
            last_checked: Some(checked_at),
            consecutive_failures: 0,
        }));
        if !was_healthy {
            tracing::info!(service = %self.name, "Service recovered");
        }
    }

    /// Record a failed probe. Failure counts accumulate across probes and
    /// reset only on success.
    pub fn mark_failure(&self, checked_at: DateTime<Utc>) {
        self.health.rcu(|current| HealthSnapshot {
            healthy: false,
            last_checked: Some(checked_at),
            consecutive_failures: current.consecutive_failures.saturating_add(1),
        });
    }

    /// Owned status copy for the observability surface.
    pub fn status(&self) -> ServiceStatus {
        let snapshot = self.snapshot();
        ServiceStatus {
            name: self.name.clone(),
            url: self.base_url.to_string(),
            healthy: snapshot.healthy,
            last_check: snapshot.last_checked,
            consecutive_failures: snapshot.consecutive_failures,
        }
    }
}

impl std::fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("ServiceEntry")
            .field("name", &self.name)
            .field("base_url", &self.base_url.as_str())
            .field("healthy", &snapshot.healthy)
            .field("consecutive_failures", &snapshot.consecutive_failures)
            .finish()
    }
}
