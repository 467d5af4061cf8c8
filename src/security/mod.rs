//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (fixed-window counters per client IP)
//!     → [auth gate]
//!     → Pass to routing
//!
//! Outgoing response:
//!     → headers.rs (hardening response headers)
//! ```
//!
//! # Design Decisions
//! - Three independent policies (global, auth paths, order creation);
//!   a request can be counted in more than one window
//! - Fail closed: an exceeded window rejects before any upstream work
//! - Lazy window reset; idle keys are retained, bounded by distinct clients

pub mod headers;
pub mod rate_limit;

pub use rate_limit::{FixedWindowLimiter, RateDecision, RateLimits};
