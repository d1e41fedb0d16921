//! Caller-facing security policy.
//!
//! # Responsibilities
//! - Authenticate callers against the configured inbound credential
//! - Enforce the process-wide request window after authentication

pub mod auth;
pub mod rate_limit;

pub use auth::AuthState;
pub use rate_limit::RateLimiter;
