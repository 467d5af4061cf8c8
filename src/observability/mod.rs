//! Observability subsystem.
//!
//! Logging is `tracing`-based and initialized in `main`; this module owns
//! the metrics facade.

pub mod metrics;
