//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Background loop (monitor.rs):
//!     Periodic timer
//!     → probe every registered service concurrently
//!     → swap each entry's HealthSnapshot in the registry
//!
//! Manual trigger (operator surface):
//!     POST /health/services/check → probe_all() → fresh snapshot
//! ```
//!
//! # Design Decisions
//! - Probe failures are state transitions, never propagated errors
//! - Probes run concurrently; one slow backend cannot delay the others
//! - The loop shares nothing with request handling except the registry

pub mod monitor;
pub mod probe;

pub use monitor::HealthMonitor;
pub use probe::HealthChecker;
