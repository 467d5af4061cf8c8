//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, route groups)
//!     → [rate limit → auth → routing table]
//!     → proxy.rs (forward to backend, relay response)
//!     → Send to client
//!
//! Operator surface:
//!     server.rs routes → handlers.rs (status, manual checks, liveness)
//!
//! Failures:
//!     error.rs (uniform {"error": ...} JSON contract)
//! ```

pub mod error;
pub mod handlers;
pub mod proxy;
pub mod request;
pub mod server;

pub use error::GatewayError;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, GatewayServer, StartupError};
