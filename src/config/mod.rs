//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! environment variables (+ optional .env file)
//!     → loader.rs (read & coerce)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults so only the credentials and upstream URL are
//!   mandatory
//! - Validation separates syntactic (parsing) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{from_env, ConfigError};
pub use schema::{
    AuthConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, RateLimitConfig, SecurityConfig,
    TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
