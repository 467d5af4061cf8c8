//! Probe and registry state-transition tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use shopsphere_gateway::config::HealthCheckConfig;
use shopsphere_gateway::health::HealthChecker;
use shopsphere_gateway::registry::ServiceRegistry;

mod common;

fn checker_with_timeout(registry: Arc<ServiceRegistry>, timeout_ms: u64) -> HealthChecker {
    HealthChecker::new(
        registry,
        &HealthCheckConfig {
            interval_ms: 30_000,
            timeout_ms,
            path: "/health".to_string(),
        },
    )
}

#[tokio::test]
async fn probe_success_marks_healthy() {
    // Scenario: backend always answers 200 on /health
    let backend = common::start_mock_backend(200, r#"{"status":"ok"}"#).await;

    let registry = Arc::new(ServiceRegistry::new());
    registry.register("order", &format!("http://{backend}")).unwrap();
    let checker = checker_with_timeout(registry.clone(), 2_000);

    assert!(checker.probe("order").await);

    let status = registry.lookup("order").unwrap();
    assert!(status.healthy);
    assert_eq!(status.consecutive_failures, 0);
    assert!(status.last_check.is_some());
}

#[tokio::test]
async fn connection_refused_increments_failures() {
    // Scenario: the backend is down; each probe cycle adds one failure
    let addr = common::refused_addr().await;

    let registry = Arc::new(ServiceRegistry::new());
    registry.register("order", &format!("http://{addr}")).unwrap();
    let checker = checker_with_timeout(registry.clone(), 1_000);

    assert!(!checker.probe("order").await);
    let status = registry.lookup("order").unwrap();
    assert!(!status.healthy);
    assert_eq!(status.consecutive_failures, 1);

    assert!(!checker.probe("order").await);
    assert_eq!(registry.lookup("order").unwrap().consecutive_failures, 2);

    // The proxy-facing lookup hides the dead URL entirely
    assert!(registry.get("order").is_none());
}

#[tokio::test]
async fn non_200_status_is_unhealthy() {
    let backend = common::start_mock_backend(500, "oops").await;

    let registry = Arc::new(ServiceRegistry::new());
    registry.register("user", &format!("http://{backend}")).unwrap();
    let checker = checker_with_timeout(registry.clone(), 1_000);

    assert!(!checker.probe("user").await);
    let status = registry.lookup("user").unwrap();
    assert!(!status.healthy);
    assert_eq!(status.consecutive_failures, 1);
}

#[tokio::test]
async fn slow_backend_times_out_as_failure() {
    let backend = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        (200, "late".to_string())
    })
    .await;

    let registry = Arc::new(ServiceRegistry::new());
    registry.register("product", &format!("http://{backend}")).unwrap();
    let checker = checker_with_timeout(registry.clone(), 100);

    assert!(!checker.probe("product").await);
    assert!(!registry.lookup("product").unwrap().healthy);
}

#[tokio::test]
async fn probe_all_runs_concurrently() {
    // Two backends that each take ~1s: sequential probing would need ~2s.
    let slow = |_| async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        (200, "ok".to_string())
    };
    let b1 = common::start_programmable_backend(slow).await;
    let b2 = common::start_programmable_backend(slow).await;

    let registry = Arc::new(ServiceRegistry::new());
    registry.register("user", &format!("http://{b1}")).unwrap();
    registry.register("order", &format!("http://{b2}")).unwrap();
    let checker = checker_with_timeout(registry.clone(), 5_000);

    let started = Instant::now();
    checker.probe_all().await;
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(1_800),
        "probe_all took {elapsed:?}; probes must run concurrently"
    );
    assert!(registry.status().iter().all(|s| s.healthy));
}

#[tokio::test]
async fn recovery_resets_the_failure_count() {
    let up = Arc::new(AtomicBool::new(false));
    let flag = up.clone();
    let backend = common::start_programmable_backend(move |_| {
        let flag = flag.clone();
        async move {
            if flag.load(Ordering::SeqCst) {
                (200, "ok".to_string())
            } else {
                (503, "down".to_string())
            }
        }
    })
    .await;

    let registry = Arc::new(ServiceRegistry::new());
    registry.register("order", &format!("http://{backend}")).unwrap();
    let checker = checker_with_timeout(registry.clone(), 1_000);

    assert!(!checker.probe("order").await);
    assert!(!checker.probe("order").await);
    assert_eq!(registry.lookup("order").unwrap().consecutive_failures, 2);

    up.store(true, Ordering::SeqCst);
    assert!(checker.probe("order").await);

    let status = registry.lookup("order").unwrap();
    assert!(status.healthy);
    assert_eq!(status.consecutive_failures, 0);
    assert!(registry.get("order").is_some());
}

#[tokio::test]
async fn probing_an_unknown_service_reports_false() {
    let registry = Arc::new(ServiceRegistry::new());
    let checker = checker_with_timeout(registry, 1_000);
    assert!(!checker.probe("ghost").await);
}
