//! Middleware for observability.
//!
//! Request logging with latency tracking. Authentication lives in
//! [`crate::auth::middleware`].

pub mod logging;

pub use logging::request_logging;
