//! Background health monitoring loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::health::HealthChecker;

/// Drives periodic health probing, independent of request handling.
pub struct HealthMonitor {
    checker: Arc<HealthChecker>,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(checker: Arc<HealthChecker>, interval: Duration) -> Self {
        Self { checker, interval }
    }

    /// Run until the shutdown signal fires. The first tick completes
    /// immediately, so services are probed once right at startup.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.checker.probe_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
