//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → table.rs (prefix lookup, longest prefix wins)
//!     → Return: matched RouteRule or explicit no-match
//!
//! Table Compilation (at startup):
//!     ServiceConfig[]
//!     → one rule per service (prefix → service name)
//!     → Sort by prefix length, freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Table compiled at startup, immutable at runtime
//! - No regex; prefix matching at segment boundaries only
//! - Explicit no-match rather than silent default (404 contract)

pub mod table;

pub use table::{RouteRule, RouteTable};
