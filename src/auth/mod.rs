//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → middleware.rs (extract Authorization: Bearer <token>)
//!     → token.rs (verify signature + expiry against shared secret)
//!     → AuthContext attached as a request extension, or short-circuit
//! ```
//!
//! # Design Decisions
//! - One verification contract (algorithm, leeway) shared by both the
//!   required and optional policies
//! - Verification is pure and stateless; nothing is cached across requests
//! - The proxy layer injects x-user-id downstream from the AuthContext

pub mod middleware;
pub mod token;

pub use middleware::{optional_auth, require_auth};
pub use token::{AuthContext, TokenError, TokenValidator};
